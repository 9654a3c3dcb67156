//! Blog post pages
//!
//! - GET  /                    - all posts
//! - GET  /post?post_id=<id>   - one post
//! - GET  /add, POST /add      - new post form / create
//! - GET  /edit/{id}, POST     - edit form / update
//! - GET  /delete_post/{id}    - delete
//!
//! Successful writes answer with `303 See Other` so the browser follows up
//! with a GET. Failed submissions re-render the form with the submitted
//! values and the messages for each field.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, PageError};
use crate::services::{FormErrors, PostForm, PostServiceError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/post", get(show_post))
        .route("/add", get(new_post_form).post(create_post))
        .route("/edit/{id}", get(edit_post_form).post(update_post))
        .route("/delete_post/{id}", get(delete_post))
}

/// Query for the detail page
///
/// Kept as a raw string so a missing or non-numeric id becomes an error
/// page instead of a plain-text extractor rejection.
#[derive(Debug, Deserialize)]
pub struct PostQuery {
    pub post_id: Option<String>,
}

impl PostQuery {
    fn id(&self) -> Result<i64, PageError> {
        let raw = self
            .post_id
            .as_deref()
            .ok_or_else(|| PageError::BadRequest("Missing post_id.".to_string()))?;
        raw.trim()
            .parse()
            .map_err(|_| PageError::BadRequest(format!("Invalid post_id: {}", raw)))
    }
}

/// One input of the post form as the template sees it
#[derive(Debug, Serialize)]
struct FieldView<'a> {
    name: &'static str,
    label: &'static str,
    value: &'a str,
    errors: &'a [String],
}

fn form_fields<'a>(form: &'a PostForm, errors: &'a FormErrors) -> Vec<FieldView<'a>> {
    let field = |name: &'static str, label: &'static str, value: &'a String| FieldView {
        name,
        label,
        value: value.as_str(),
        errors: errors.for_field(name),
    };

    vec![
        field("title", "Blog Post Title", &form.title),
        field("subtitle", "Subtitle", &form.subtitle),
        field("author", "Your Name", &form.author),
        field("img_url", "Blog Image URL", &form.img_url),
        field("body", "Blog Content", &form.body),
    ]
}

fn render_form(
    state: &AppState,
    form: &PostForm,
    errors: &FormErrors,
    edit_id: Option<i64>,
) -> Result<Html<String>, PageError> {
    let mut ctx = TeraContext::new();
    ctx.insert("is_edit", &edit_id.is_some());
    ctx.insert(
        "action",
        &edit_id.map_or_else(|| "/add".to_string(), |id| format!("/edit/{}", id)),
    );
    ctx.insert("fields", &form_fields(form, errors));

    Ok(Html(state.theme.render("make-post.html", &ctx)?))
}

/// Turn a failed write into form errors, or pass it through as a page error
fn form_errors(err: PostServiceError) -> Result<FormErrors, PageError> {
    match err {
        PostServiceError::Validation(errors) => Ok(errors),
        PostServiceError::DuplicateTitle(_) => {
            let mut errors = FormErrors::new();
            errors.add("title", "A post with this title already exists.");
            Ok(errors)
        }
        other => Err(other.into()),
    }
}

async fn list_posts(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let posts = state.post_service.list().await?;

    let mut ctx = TeraContext::new();
    ctx.insert("all_posts", &posts);

    Ok(Html(state.theme.render("index.html", &ctx)?))
}

async fn show_post(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<Html<String>, PageError> {
    let post = state.post_service.get_by_id(query.id()?).await?;

    let mut ctx = TeraContext::new();
    ctx.insert("post", &post);

    Ok(Html(state.theme.render("post.html", &ctx)?))
}

async fn new_post_form(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    render_form(&state, &PostForm::default(), &FormErrors::new(), None)
}

async fn create_post(
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> Result<Response, PageError> {
    match state.post_service.create(&form).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(err) => {
            let errors = form_errors(err)?;
            Ok(render_form(&state, &form, &errors, None)?.into_response())
        }
    }
}

async fn edit_post_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let post = state.post_service.get_by_id(id).await?;
    render_form(&state, &PostForm::from_post(&post), &FormErrors::new(), Some(id))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, PageError> {
    // 404 before validation, so a form for a missing post is never shown
    state.post_service.get_by_id(id).await?;

    let result = match form.validate() {
        Ok(fields) => state.post_service.update(id, fields.into()).await,
        Err(errors) => Err(PostServiceError::Validation(errors)),
    };

    match result {
        Ok(post) => Ok(Redirect::to(&format!("/post?post_id={}", post.id)).into_response()),
        Err(err) => {
            let errors = form_errors(err)?;
            Ok(render_form(&state, &form, &errors, Some(id))?.into_response())
        }
    }
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, PageError> {
    state.post_service.delete(id).await?;
    Ok(Redirect::to("/"))
}
