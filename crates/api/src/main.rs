use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dmf_api::config::ServerConfig;
use dmf_api::router::build_app_router;
use dmf_api::state::AppState;
use dmf_core::config::{HttpClientConfig, TableStorageConfig};
use dmf_storage::TableEventStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dmf_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    let table_config = TableStorageConfig::from_env().expect("Invalid table storage configuration");
    let http_config = HttpClientConfig::from_env().expect("Invalid HTTP client configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        route = %config.status_route,
        table = %table_config.table_name,
        "Loaded server configuration"
    );

    // --- Table storage ---
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(http_config.timeout_secs))
        .build()
        .expect("Failed to build reqwest HTTP client");
    let events = TableEventStore::new(client, &table_config)
        .expect("Invalid table storage configuration");

    // --- App state ---
    let state = AppState {
        events: Arc::new(events),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST:PORT combination");

    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
