//! Database layer
//!
//! SQLite is the default backend; MySQL can be selected in `config.yml`.
//!
//! ```ignore
//! use blogsmith::config::DatabaseConfig;
//! use blogsmith::db::{migrations, Database};
//!
//! let pool = Database::connect(&DatabaseConfig::default()).await?;
//! pool.ping().await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{Database, DbPool};
