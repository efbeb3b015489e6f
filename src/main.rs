use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use car_rental::config::AppConfig;
use car_rental::db;
use car_rental::handlers;
use car_rental::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;

    let conn = db::init_db_with_timeout(&config.database_url, config.db_busy_timeout)?;
    tracing::info!(database = %config.database_url, "database ready");

    if config.seed_demo_data {
        db::seed::seed_demo_data(&conn)?;
    }

    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is the default value, set it before exposing the service");
    }

    let state = Arc::new(AppState::new(conn, config.clone()));
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
