//! API layer - HTTP handlers and routing
//!
//! - Blog pages (list, detail, create, edit, delete)
//! - Static pages (about, contact)
//! - House price prediction JSON endpoints

pub mod middleware;
pub mod pages;
pub mod posts;
pub mod predict;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, PageError};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(posts::router())
        .merge(pages::router())
        .merge(predict::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
