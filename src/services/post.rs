//! Blog post service
//!
//! Business rules on top of `PostRepository`:
//! - every write is validated with the same rules as the post form
//! - titles are unique; a clash fails the write instead of overwriting
//! - the display date is stamped on create and refreshed on every update
//! - missing posts are reported as `NotFound`, including repeated deletes

use crate::db::repositories::PostRepository;
use crate::models::{today, BlogPost, UpdatePostInput};
use crate::services::form::{validate_update, FormErrors, PostForm};
use anyhow::Context;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// One or more fields failed validation
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Another post already uses this title
    #[error("A post titled '{0}' already exists")]
    DuplicateTitle(String),

    /// No post with this id
    #[error("Post {0} not found")]
    NotFound(i64),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Validate a submitted form and store it as a new post
    ///
    /// # Errors
    /// - `Validation` if any field is missing, too long, or the image URL is malformed
    /// - `DuplicateTitle` if the title is taken
    pub async fn create(&self, form: &PostForm) -> Result<BlogPost, PostServiceError> {
        let fields = form.validate().map_err(|errors| {
            tracing::debug!("Rejected new post: {}", errors);
            PostServiceError::Validation(errors)
        })?;

        if self
            .repo
            .exists_by_title(&fields.title)
            .await
            .context("Failed to check title uniqueness")?
        {
            return Err(PostServiceError::DuplicateTitle(fields.title));
        }

        let post = self
            .repo
            .create(&fields, &today())
            .await
            .map_err(|e| map_write_error(e, &fields.title))?;

        tracing::info!("Created post {} '{}'", post.id, post.title);
        Ok(post)
    }

    /// All posts, oldest first
    pub async fn list(&self) -> Result<Vec<BlogPost>, PostServiceError> {
        Ok(self.repo.list().await.context("Failed to list posts")?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<BlogPost, PostServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound(id))
    }

    /// Apply a partial update and refresh the post's date
    ///
    /// # Errors
    /// - `NotFound` if the post doesn't exist
    /// - `Validation` if a supplied field is invalid
    /// - `DuplicateTitle` if the new title belongs to another post
    pub async fn update(
        &self,
        id: i64,
        input: UpdatePostInput,
    ) -> Result<BlogPost, PostServiceError> {
        let mut post = self.get_by_id(id).await?;

        let input = validate_update(input).map_err(|errors| {
            tracing::debug!("Rejected update of post {}: {}", id, errors);
            PostServiceError::Validation(errors)
        })?;

        if let Some(ref title) = input.title {
            if title != &post.title
                && self
                    .repo
                    .exists_by_title_excluding(title, id)
                    .await
                    .context("Failed to check title uniqueness")?
            {
                return Err(PostServiceError::DuplicateTitle(title.clone()));
            }
        }

        post.apply(input);
        post.date = today();

        let updated = self
            .repo
            .update(&post)
            .await
            .map_err(|e| map_write_error(e, &post.title))?
            .ok_or(PostServiceError::NotFound(id))?;

        tracing::info!("Updated post {} '{}'", updated.id, updated.title);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), PostServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete post")? {
            return Err(PostServiceError::NotFound(id));
        }

        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, PostServiceError> {
        Ok(self.repo.count().await.context("Failed to count posts")?)
    }
}

/// A unique-constraint violation that slipped past the pre-check (two
/// concurrent writers) still surfaces as `DuplicateTitle`.
fn map_write_error(err: anyhow::Error, title: &str) -> PostServiceError {
    let unique_violation = err
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation());

    if unique_violation {
        PostServiceError::DuplicateTitle(title.to_string())
    } else {
        PostServiceError::Internal(err)
    }
}
