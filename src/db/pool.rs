//! Database connection pool
//!
//! `Database` holds either a SQLite or a MySQL pool, picked from
//! `config.yml` at startup and shared as a `DbPool`. Repositories branch on
//! `driver()` only where the two SQL dialects differ.

use anyhow::{Context, Result};
use sqlx::{
    mysql::{MySqlPool, MySqlPoolOptions},
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{DatabaseConfig, DatabaseDriver};

const SQLITE_MAX_CONNECTIONS: u32 = 8;
const MYSQL_MAX_CONNECTIONS: u32 = 16;

/// Shared handle to the database
pub type DbPool = Arc<Database>;

pub enum Database {
    Sqlite(SqlitePool),
    Mysql(MySqlPool),
}

/// Where a configured SQLite URL points
#[derive(Debug, PartialEq, Eq)]
struct SqliteTarget {
    connect_url: String,
    /// Database file, `None` for in-memory databases
    file: Option<PathBuf>,
}

impl SqliteTarget {
    /// Accepts `:memory:`, a `sqlite:` URL or a bare file path
    fn parse(url: &str) -> Self {
        if url == ":memory:" || url.starts_with("sqlite::memory:") {
            return Self {
                connect_url: "sqlite::memory:".to_string(),
                file: None,
            };
        }

        let rest = url.strip_prefix("sqlite:").unwrap_or(url);
        let (path, query) = rest.split_once('?').unwrap_or((rest, "mode=rwc"));

        Self {
            connect_url: format!("sqlite:{}?{}", path, query),
            file: Some(PathBuf::from(path)),
        }
    }

    // Every connection to an in-memory database opens its own empty database
    fn max_connections(&self) -> u32 {
        if self.file.is_some() {
            SQLITE_MAX_CONNECTIONS
        } else {
            1
        }
    }
}

impl Database {
    /// Connect with the configured driver and URL
    pub async fn connect(config: &DatabaseConfig) -> Result<DbPool> {
        let db = match config.driver {
            DatabaseDriver::Sqlite => Self::connect_sqlite(&config.url).await?,
            DatabaseDriver::Mysql => Self::connect_mysql(&config.url).await?,
        };
        Ok(Arc::new(db))
    }

    /// A private in-memory SQLite database
    pub async fn in_memory() -> Result<DbPool> {
        Ok(Arc::new(Self::connect_sqlite(":memory:").await?))
    }

    async fn connect_sqlite(url: &str) -> Result<Self> {
        let target = SqliteTarget::parse(url);

        if let Some(parent) = target.file.as_deref().and_then(|f| f.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(target.max_connections())
            .connect(&target.connect_url)
            .await
            .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

        Ok(Self::Sqlite(pool))
    }

    async fn connect_mysql(url: &str) -> Result<Self> {
        let connect_url = if url.starts_with("mysql://") {
            url.to_string()
        } else {
            format!("mysql://{}", url)
        };

        let pool = MySqlPoolOptions::new()
            .max_connections(MYSQL_MAX_CONNECTIONS)
            .connect(&connect_url)
            .await
            .with_context(|| format!("Failed to connect to MySQL database: {}", url))?;

        Ok(Self::Mysql(pool))
    }

    pub fn driver(&self) -> DatabaseDriver {
        match self {
            Self::Sqlite(_) => DatabaseDriver::Sqlite,
            Self::Mysql(_) => DatabaseDriver::Mysql,
        }
    }

    /// The SQLite pool, or an error on MySQL
    pub fn sqlite(&self) -> Result<&SqlitePool> {
        match self {
            Self::Sqlite(pool) => Ok(pool),
            Self::Mysql(_) => anyhow::bail!("Database pool is not backed by SQLite"),
        }
    }

    /// The MySQL pool, or an error on SQLite
    pub fn mysql(&self) -> Result<&MySqlPool> {
        match self {
            Self::Mysql(pool) => Ok(pool),
            Self::Sqlite(_) => anyhow::bail!("Database pool is not backed by MySQL"),
        }
    }

    /// Run one statement that returns no rows
    pub async fn execute(&self, statement: &str) -> Result<u64> {
        let result = match self {
            Self::Sqlite(pool) => sqlx::query(statement).execute(pool).await.map(|r| r.rows_affected()),
            Self::Mysql(pool) => sqlx::query(statement).execute(pool).await.map(|r| r.rows_affected()),
        };
        result.with_context(|| format!("Failed to execute query: {}", statement))
    }

    /// Round-trip a trivial query; run once at startup
    pub async fn ping(&self) -> Result<()> {
        let result = match self {
            Self::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Self::Mysql(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        };
        result.context("Database ping failed")
    }

    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Mysql(pool) => pool.close().await,
        }
    }
}
