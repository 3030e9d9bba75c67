//! Server Binary
//!
//! Wires up:
//! - Configuration from the environment / `.env`
//! - The yt-dlp process adapter behind the job runner
//! - The HTTP inbound adapter

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tubegrab::{http, JobRunner, RunnerSettings, ServiceConfig, YtDlp};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubegrab=info,tower_http=info")),
        )
        .init();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // 1. Adapter + application service
    let downloader = YtDlp::new(&config.ytdlp_bin);
    let runner = match JobRunner::new(downloader, RunnerSettings::from(&config)) {
        Ok(runner) => Arc::new(runner),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // 2. HTTP layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = http::router(runner)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // 3. Start server
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!(
        addr = %config.addr,
        port = config.port,
        work_dir = %config.work_dir.display(),
        max_size_mb = config.max_size_mb(),
        "Listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
