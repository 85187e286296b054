//! HTTP server for the Payroll Import Engine.
//!
//! Environment:
//! - `PAYROLL_BIND_ADDR`: listen address, default `127.0.0.1:8080`
//! - `PAYROLL_CONFIG_DIR`: directory holding `import.yaml`; the built-in
//!   configuration is used when unset
//! - `RUST_LOG`: tracing filter, default `info`

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let loader = match std::env::var("PAYROLL_CONFIG_DIR") {
        Ok(dir) => {
            info!(config_dir = %dir, "Loading import configuration");
            ConfigLoader::load(&dir)?
        }
        Err(_) => {
            info!("Using built-in import configuration");
            ConfigLoader::builtin()
        }
    };

    let app = create_router(AppState::new(loader));

    let addr = std::env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
