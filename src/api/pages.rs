//! Static pages

use axum::{extract::State, response::Html, routing::get, Router};
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, PageError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about", get(about))
        .route("/contact", get(contact))
}

async fn about(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    Ok(Html(state.theme.render("about.html", &TeraContext::new())?))
}

async fn contact(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    Ok(Html(state.theme.render("contact.html", &TeraContext::new())?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::test_server;

    #[tokio::test]
    async fn test_static_pages() {
        let (server, _state) = test_server().await;

        let about = server.get("/about").await;
        about.assert_status_ok();
        assert!(about.text().contains("About Me"));

        let contact = server.get("/contact").await;
        contact.assert_status_ok();
        assert!(contact.text().contains("Contact Me"));
    }
}
