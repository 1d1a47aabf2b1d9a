//! CreativeFlow backend: settings, credential service and the v1 API router.
//! Used by: binary entrypoint.

pub mod config;
pub mod dependencies;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod security;
pub mod server;
pub mod state;
pub mod telemetry;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::Settings::from_env()?;

    let default_level = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let addr = settings.bind_addr.clone();
    tracing::info!(app = %settings.app_name, "starting on {}", addr);
    let state = state::build_state(settings)?;

    server::run(state, &addr).await?;
    Ok(())
}
