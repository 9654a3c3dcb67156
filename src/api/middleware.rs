//! Shared request state and error responses
//!
//! - `AppState`: services built once at startup and cloned into handlers
//! - `ApiError`: JSON error envelope for the prediction endpoints
//! - `PageError`: HTML error pages for the blog routes

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::{EstimatorError, PostService, PostServiceError, PriceEstimator};
use crate::theme::ThemeEngine;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub estimator: Arc<PriceEstimator>,
    pub theme: Arc<ThemeEngine>,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn unknown_location(message: impl Into<String>) -> Self {
        Self::new("UNKNOWN_LOCATION", message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new("OUT_OF_RANGE", message)
    }
}

impl From<EstimatorError> for ApiError {
    fn from(err: EstimatorError) -> Self {
        match err {
            EstimatorError::UnknownLocation(_) => Self::unknown_location(err.to_string()),
            EstimatorError::InvalidQuery(_) => Self::validation_error(err.to_string()),
            EstimatorError::OutOfRange(_) => Self::out_of_range(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "UNKNOWN_LOCATION" | "OUT_OF_RANGE" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Error page for the HTML routes
///
/// Rendered without the theme engine so a broken template can still
/// produce an error page.
#[derive(Debug)]
pub enum PageError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::BadRequest(m) => m,
            // Internal details stay in the log
            Self::Internal(_) => "Something went wrong.",
        }
    }
}

impl From<PostServiceError> for PageError {
    fn from(err: PostServiceError) -> Self {
        match err {
            PostServiceError::NotFound(id) => Self::NotFound(format!("Post {} not found.", id)),
            PostServiceError::Validation(errors) => Self::BadRequest(errors.to_string()),
            PostServiceError::DuplicateTitle(_) => Self::BadRequest(err.to_string()),
            PostServiceError::Internal(e) => Self::Internal(format!("{:#}", e)),
        }
    }
}

impl From<crate::theme::ThemeError> for PageError {
    fn from(err: crate::theme::ThemeError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(ref detail) = self {
            tracing::error!("Request failed: {}", detail);
        }

        let html = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{code}</title></head>\n\
             <body>\n<h1>{code}</h1>\n<p>{message}</p>\n<a href=\"/\">Back to all posts</a>\n</body>\n</html>\n",
            code = status,
            message = tera::escape_html(self.message()),
        );

        (status, Html(html)).into_response()
    }
}
