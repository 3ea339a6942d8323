//! Bookshelf Server - library catalog and lending

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    init_tracing(&config.logging);

    tracing::info!("Starting Bookshelf Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState::new(config, Repository::new(pool));
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookshelf_server={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
