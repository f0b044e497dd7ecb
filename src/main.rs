//! # Red Apuntes
//!
//! Application entry point. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - HTTP server

use anyhow::Result;
use tracing::info;

use red_apuntes::config::Settings;
use red_apuntes::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    red_apuntes::telemetry::init_tracing();

    info!("Starting Red Apuntes API...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
