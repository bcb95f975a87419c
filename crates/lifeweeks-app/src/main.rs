//! Life Weeks notification backbone entry point.

use std::error::Error;

use lifeweeks_app::config::AppConfig;
use lifeweeks_app::container::App;
use lifeweeks_app::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Life Weeks notification backbone");

    let app = App::build(&config).await?;
    app.seed_schedules().await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    let engine = app.shutdown().await?;
    tracing::info!(jobs = engine.len(), "Stopped");

    telemetry.shutdown();
    Ok(())
}
