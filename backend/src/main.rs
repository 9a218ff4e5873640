//! Backend entry-point: loads settings, serves the API and exits with the
//! lifecycle's status.

use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use carbon_api::AppSettings;
use carbon_api::inbound::http::state::HttpState;
use carbon_api::server::{ServerConfig, ServerLifecycle, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<ExitCode> {
    let dotenv = dotenvy::dotenv();

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    if let Some(e) = dotenv.err().filter(|e| !e.not_found()) {
        warn!(error = %e, "ignoring unreadable .env file");
    }

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let environment = settings.environment().map_err(std::io::Error::other)?;
    let state = HttpState::new(settings.credentials(), environment);

    let server = create_server(ServerConfig::new(
        state,
        settings.host(),
        settings.port(),
    ))?;
    let lifecycle = ServerLifecycle::new(&server);
    lifecycle.install_panic_hook();

    let reason = lifecycle.run(server).await?;
    info!(?reason, "server stopped");
    Ok(reason.exit_code())
}
