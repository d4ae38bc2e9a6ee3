//! AI/Tech Daily functions server.
//!
//! Configuration comes from the environment (see `FunctionsConfig`). Logs go
//! to stderr, filtered by `RUST_LOG` (default `info`); set `AITECH_LOG_JSON=1`
//! for one JSON object per line.

use std::sync::Arc;

use aitech_daily_lib::functions::{self, FunctionsConfig, FunctionsState};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("AITECH_LOG_JSON").is_ok_and(|v| v == "1");

    // `init` also routes `log` records from the library through the subscriber.
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

async fn run() -> Result<(), String> {
    let config = FunctionsConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let state = FunctionsState::from_config(config)?;

    tracing::info!(
        admin = state.admin.is_some(),
        email = state.email.is_some(),
        llm = state.llm.is_some(),
        "functions configured"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", bind_addr, e))?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, functions::router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
