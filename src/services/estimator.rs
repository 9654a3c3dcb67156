//! House price estimator
//!
//! Wraps a pre-trained regression model exported as two JSON artifacts:
//!
//! - `columns.json`: `{"data_columns": ["total_sqft", "bath", "bhk", <locations>...]}`
//! - `model.json`: `{"intercept": f64, "coefficients": [f64, ...]}`, one
//!   coefficient per data column
//!
//! The estimator is loaded once at startup and never mutated afterwards.
//! Location lookup is case-sensitive.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of leading numeric columns before the one-hot location columns
const NUMERIC_COLUMNS: usize = 3;

/// Errors returned by `PriceEstimator::estimate`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimatorError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The model produced no usable number for this input
    #[error("Estimate out of range for {0}")]
    OutOfRange(String),
}

/// Opaque regression model mapping a feature vector to a price
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> f64;

    /// Number of features the model expects
    fn feature_count(&self) -> usize;
}

/// Linear regression: `intercept + coefficients · features`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn feature_count(&self) -> usize {
        self.coefficients.len()
    }
}

#[derive(Debug, Deserialize)]
struct ColumnsFile {
    data_columns: Vec<String>,
}

/// Validated input for a single estimate
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuery {
    pub location: String,
    pub total_sqft: f64,
    pub bhk: i64,
    pub bath: i64,
}

impl PriceQuery {
    fn validate(&self) -> Result<(), EstimatorError> {
        if !self.total_sqft.is_finite() || self.total_sqft <= 0.0 {
            return Err(EstimatorError::InvalidQuery(
                "total_sqft must be a positive number".to_string(),
            ));
        }
        if self.bhk <= 0 {
            return Err(EstimatorError::InvalidQuery(
                "bhk must be a positive integer".to_string(),
            ));
        }
        if self.bath <= 0 {
            return Err(EstimatorError::InvalidQuery(
                "bath must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Price estimator holding the column vocabulary and the model
pub struct PriceEstimator {
    data_columns: Vec<String>,
    locations: Vec<String>,
    predictor: Box<dyn Predictor>,
}

impl std::fmt::Debug for PriceEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceEstimator")
            .field("data_columns", &self.data_columns.len())
            .field("locations", &self.locations.len())
            .finish()
    }
}

impl PriceEstimator {
    /// Build an estimator from the column list and any predictor
    ///
    /// Fails if there are fewer than the three numeric columns or if the
    /// predictor expects a different number of features.
    pub fn new(data_columns: Vec<String>, predictor: Box<dyn Predictor>) -> Result<Self> {
        if data_columns.len() < NUMERIC_COLUMNS {
            anyhow::bail!(
                "Expected at least {} data columns, found {}",
                NUMERIC_COLUMNS,
                data_columns.len()
            );
        }
        if predictor.feature_count() != data_columns.len() {
            anyhow::bail!(
                "Model expects {} features but {} data columns were given",
                predictor.feature_count(),
                data_columns.len()
            );
        }

        let mut locations = data_columns[NUMERIC_COLUMNS..].to_vec();
        locations.sort();
        locations.dedup();

        Ok(Self {
            data_columns,
            locations,
            predictor,
        })
    }

    /// Parse the JSON artifacts into a linear-model estimator
    pub fn from_json(columns_json: &str, model_json: &str) -> Result<Self> {
        let columns: ColumnsFile =
            serde_json::from_str(columns_json).context("Failed to parse columns artifact")?;
        let model: LinearModel =
            serde_json::from_str(model_json).context("Failed to parse model artifact")?;
        Self::new(columns.data_columns, Box::new(model))
    }

    /// Load the artifacts from disk
    pub fn load(columns_path: &Path, model_path: &Path) -> Result<Self> {
        let columns_json = std::fs::read_to_string(columns_path)
            .with_context(|| format!("Failed to read columns artifact: {:?}", columns_path))?;
        let model_json = std::fs::read_to_string(model_path)
            .with_context(|| format!("Failed to read model artifact: {:?}", model_path))?;

        let estimator = Self::from_json(&columns_json, &model_json)?;
        tracing::info!(
            "Loaded price model with {} locations",
            estimator.locations.len()
        );
        Ok(estimator)
    }

    /// Known locations, sorted ascending without duplicates
    pub fn list_known_locations(&self) -> Vec<String> {
        self.locations.clone()
    }

    /// Estimate a price, rounded to two decimals
    ///
    /// # Errors
    /// - `InvalidQuery` for non-positive area, bedrooms or bathrooms
    /// - `UnknownLocation` if the location is not in the vocabulary
    /// - `OutOfRange` if the estimate is not a finite number
    pub fn estimate(
        &self,
        location: &str,
        total_sqft: f64,
        bhk: i64,
        bath: i64,
    ) -> Result<f64, EstimatorError> {
        self.estimate_query(&PriceQuery {
            location: location.to_string(),
            total_sqft,
            bhk,
            bath,
        })
    }

    pub fn estimate_query(&self, query: &PriceQuery) -> Result<f64, EstimatorError> {
        query.validate()?;

        let index = self
            .location_index(&query.location)
            .ok_or_else(|| EstimatorError::UnknownLocation(query.location.clone()))?;

        let mut features = vec![0.0; self.data_columns.len()];
        features[0] = query.total_sqft;
        features[1] = query.bath as f64;
        features[2] = query.bhk as f64;
        features[index] = 1.0;

        let out_of_range = || {
            EstimatorError::OutOfRange(format!(
                "{} sqft, {} bhk, {} bath in {}",
                query.total_sqft, query.bhk, query.bath, query.location
            ))
        };

        let price = self.predictor.predict(&features);
        if !price.is_finite() {
            return Err(out_of_range());
        }

        let rounded = (price * 100.0).round() / 100.0;
        if !rounded.is_finite() {
            return Err(out_of_range());
        }
        Ok(rounded)
    }

    fn location_index(&self, location: &str) -> Option<usize> {
        self.data_columns
            .iter()
            .skip(NUMERIC_COLUMNS)
            .position(|column| column == location)
            .map(|pos| pos + NUMERIC_COLUMNS)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn estimator() -> PriceEstimator {
        PriceEstimator::from_json(
            r#"{"data_columns": ["total_sqft", "bath", "bhk", "Hebbal", "Whitefield"]}"#,
            r#"{"intercept": 1.0, "coefficients": [0.1, 2.0, 3.0, 5.0, 7.0]}"#,
        )
        .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Identical inputs always produce identical estimates.
        #[test]
        fn estimate_deterministic(sqft in 1.0f64..10_000.0, bhk in 1i64..10, bath in 1i64..10) {
            let estimator = estimator();
            let a = estimator.estimate("Whitefield", sqft, bhk, bath).unwrap();
            let b = estimator.estimate("Whitefield", sqft, bhk, bath).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Any name outside the vocabulary is an unknown location.
        #[test]
        fn unlisted_location_unknown(name in "[a-z]{1,12}") {
            let result = estimator().estimate(&name, 1000.0, 2, 2);
            prop_assert_eq!(result, Err(EstimatorError::UnknownLocation(name)));
        }
    }
}
