//! Services layer - Business logic
//!
//! - `post`: blog post CRUD rules on top of the repository
//! - `form`: post form validation
//! - `estimator`: house price estimates from the exported regression model

pub mod estimator;
pub mod form;
pub mod post;

pub use estimator::{EstimatorError, LinearModel, PriceEstimator, PriceQuery, Predictor};
pub use form::{FormErrors, PostForm};
pub use post::{PostService, PostServiceError};
