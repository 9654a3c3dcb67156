//! Blogsmith - a small blog with a house price estimator

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogsmith::{
    api::{self, AppState},
    config::Config,
    db::{self, repositories::SqlxPostRepository, Database},
    services::{PostService, PriceEstimator},
    theme::ThemeEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogsmith=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Blogsmith...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = Database::connect(&config.database).await?;
    pool.ping().await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Load the price model once; it is read-only from here on
    let estimator = PriceEstimator::load(
        &config.estimator.columns_path,
        &config.estimator.model_path,
    )
    .context("Failed to load price model")?;

    let theme = ThemeEngine::new(&config.theme.path)?;
    tracing::info!("Theme engine initialized");

    let post_service = Arc::new(PostService::new(SqlxPostRepository::boxed(pool.clone())));

    let state = AppState {
        post_service,
        estimator: Arc::new(estimator),
        theme: Arc::new(theme),
    };

    // Build router
    let app = api::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Database closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
