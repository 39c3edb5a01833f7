use anyhow::{Context, Result};
use dotenv::dotenv;
use portal::{handler::AppRouter, state::AppState};
use shared::{
    config::Config,
    utils::{Telemetry, init_logger},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::new("portal", config.otel_endpoint.clone());

    let logger_provider = telemetry
        .init_logger()
        .context("Failed to initialize log provider")?;
    telemetry
        .init_meter()
        .context("Failed to initialize meter provider")?;
    telemetry
        .init_tracer()
        .context("Failed to initialize tracer provider")?;

    let _log_guard = init_logger(
        logger_provider,
        "portal",
        config.dev_mode,
        config.enable_file_log,
    );

    let state = AppState::new(&config)
        .await
        .context("Failed to create AppState")?;

    AppRouter::serve(config.port, state)
        .await
        .context("Failed to start server")?;

    info!("Shutting down portal...");

    telemetry.shutdown()?;

    Ok(())
}
