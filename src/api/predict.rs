//! House price prediction endpoints
//!
//! - GET /get_location_names       - known locations
//! - GET|POST /predict_home_price  - estimate from form fields
//!   `total_sqft`, `location`, `bhk`, `bath`
//!
//! These routes are called from a separate static front end, so they allow
//! any origin.

use axum::{
    extract::State,
    http::{header, Method},
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::api::middleware::{ApiError, AppState};
use crate::services::PriceQuery;

pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/get_location_names", get(get_location_names))
        .route(
            "/predict_home_price",
            get(predict_home_price).post(predict_home_price),
        )
        .layer(cors)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocationsResponse {
    pub locations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub estimated_price: f64,
}

/// Raw prediction fields
///
/// Read as strings so a missing or malformed number is reported in the
/// JSON error envelope instead of as an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PredictParams {
    pub total_sqft: Option<String>,
    pub location: Option<String>,
    pub bhk: Option<String>,
    pub bath: Option<String>,
}

impl PredictParams {
    pub fn into_query(self) -> Result<PriceQuery, ApiError> {
        Ok(PriceQuery {
            total_sqft: parse_field(self.total_sqft, "total_sqft")?,
            location: required(self.location, "location")?,
            bhk: parse_field(self.bhk, "bhk")?,
            bath: parse_field(self.bath, "bath")?,
        })
    }
}

/// The value is returned untouched: locations match exactly, padding included
fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::validation_error(format!("Missing field: {}", name)))
}

fn parse_field<T: std::str::FromStr>(value: Option<String>, name: &str) -> Result<T, ApiError> {
    let raw = required(value, name)?;
    raw.trim()
        .parse()
        .map_err(|_| ApiError::validation_error(format!("Invalid {}: {}", name, raw)))
}

async fn get_location_names(State(state): State<AppState>) -> Json<LocationsResponse> {
    Json(LocationsResponse {
        locations: state.estimator.list_known_locations(),
    })
}

/// Axum's `Form` reads the query string on GET and the urlencoded body
/// otherwise, so one handler serves both methods.
async fn predict_home_price(
    State(state): State<AppState>,
    Form(params): Form<PredictParams>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let query = params.into_query()?;
    let estimated_price = state.estimator.estimate_query(&query).map_err(|e| {
        tracing::debug!("Rejected estimate: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(EstimateResponse { estimated_price }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_server;
    use axum::http::StatusCode;

    #[test]
    fn test_into_query_parses_fields() {
        let params = PredictParams {
            total_sqft: Some(" 1000 ".to_string()),
            location: Some("Whitefield".to_string()),
            bhk: Some("2".to_string()),
            bath: Some("2".to_string()),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.location, "Whitefield");
        assert_eq!(query.total_sqft, 1000.0);
        assert_eq!(query.bhk, 2);
        assert_eq!(query.bath, 2);
    }

    #[test]
    fn test_into_query_rejects_missing_and_malformed() {
        let err = PredictParams::default().into_query().unwrap_err();
        assert_eq!(err.error.code, "VALIDATION_ERROR");
        assert!(err.error.message.contains("total_sqft"));

        let params = PredictParams {
            total_sqft: Some("1000".to_string()),
            location: Some("Whitefield".to_string()),
            bhk: Some("two".to_string()),
            bath: Some("2".to_string()),
        };
        let err = params.into_query().unwrap_err();
        assert_eq!(err.error.message, "Invalid bhk: two");
    }

    #[tokio::test]
    async fn test_location_names_sorted() {
        let (server, _state) = test_server().await;

        let response = server.get("/get_location_names").await;
        response.assert_status_ok();

        let body: LocationsResponse = response.json();
        let mut sorted = body.locations.clone();
        sorted.sort();
        assert_eq!(body.locations, sorted);
        assert!(body.locations.contains(&"Whitefield".to_string()));
    }

    #[tokio::test]
    async fn test_predict_via_post_form() {
        let (server, state) = test_server().await;

        let response = server
            .post("/predict_home_price")
            .form(&[
                ("total_sqft", "1000"),
                ("location", "Whitefield"),
                ("bhk", "2"),
                ("bath", "2"),
            ])
            .await;
        response.assert_status_ok();

        let body: EstimateResponse = response.json();
        let expected = state.estimator.estimate("Whitefield", 1000.0, 2, 2).unwrap();
        assert_eq!(body.estimated_price, expected);
    }

    #[tokio::test]
    async fn test_predict_via_get_query() {
        let (server, state) = test_server().await;

        let response = server
            .get("/predict_home_price")
            .add_query_param("total_sqft", 1500)
            .add_query_param("location", "Hebbal")
            .add_query_param("bhk", 3)
            .add_query_param("bath", 2)
            .await;
        response.assert_status_ok();

        let body: EstimateResponse = response.json();
        let expected = state.estimator.estimate("Hebbal", 1500.0, 3, 2).unwrap();
        assert_eq!(body.estimated_price, expected);
    }

    #[tokio::test]
    async fn test_predict_unknown_location_is_422() {
        let (server, _state) = test_server().await;

        let response = server
            .post("/predict_home_price")
            .form(&[
                ("total_sqft", "1000"),
                ("location", "Atlantis"),
                ("bhk", "2"),
                ("bath", "2"),
            ])
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: ApiError = response.json();
        assert_eq!(body.error.code, "UNKNOWN_LOCATION");
    }

    #[tokio::test]
    async fn test_predict_padded_location_is_unknown() {
        let (server, _state) = test_server().await;

        let response = server
            .post("/predict_home_price")
            .form(&[
                ("total_sqft", "1000"),
                ("location", " Whitefield "),
                ("bhk", "2"),
                ("bath", "2"),
            ])
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: ApiError = response.json();
        assert_eq!(body.error.code, "UNKNOWN_LOCATION");
    }

    #[tokio::test]
    async fn test_predict_huge_area_is_422_not_null() {
        let (server, _state) = test_server().await;

        let response = server
            .post("/predict_home_price")
            .form(&[
                ("total_sqft", "1e308"),
                ("location", "Whitefield"),
                ("bhk", "2"),
                ("bath", "2"),
            ])
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: ApiError = response.json();
        assert_eq!(body.error.code, "OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn test_predict_missing_field_is_400() {
        let (server, _state) = test_server().await;

        let response = server
            .post("/predict_home_price")
            .form(&[("location", "Whitefield"), ("bhk", "2"), ("bath", "2")])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: ApiError = response.json();
        assert_eq!(body.error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_predict_non_positive_is_400() {
        let (server, _state) = test_server().await;

        let response = server
            .post("/predict_home_price")
            .form(&[
                ("total_sqft", "-5"),
                ("location", "Whitefield"),
                ("bhk", "2"),
                ("bath", "2"),
            ])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (server, _state) = test_server().await;

        let response = server
            .get("/get_location_names")
            .add_header(header::ORIGIN, "http://localhost:8080")
            .await;
        response.assert_status_ok();
        assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
    }
}
