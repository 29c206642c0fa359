use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dmf_core::config::{ErpConfig, HttpClientConfig};
use dmf_pipeline::PackageImporter;
use dmf_worker::config::WorkerConfig;
use dmf_worker::landing::LandingWatcher;
use dmf_worker::trigger::PackageTrigger;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dmf_worker=debug,dmf_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let worker_config = WorkerConfig::from_env().expect("Invalid worker configuration");
    let erp_config = ErpConfig::from_env().expect("Invalid ERP configuration");
    let http_config = HttpClientConfig::from_env().expect("Invalid HTTP client configuration");
    tracing::info!(
        landing_dir = %worker_config.landing_dir.display(),
        resource = %erp_config.resource,
        project = %erp_config.project_name,
        "Loaded worker configuration"
    );

    // --- HTTP client ---
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(http_config.timeout_secs))
        .build()
        .expect("Failed to build reqwest HTTP client");

    // --- Trigger ---
    let importer = Arc::new(PackageImporter::new(client, &erp_config));
    let trigger = PackageTrigger::new(
        importer,
        Arc::new(erp_config),
        LandingWatcher::new(worker_config.landing_dir),
        worker_config.poll_interval,
    );

    let cancel = CancellationToken::new();
    let trigger_handle = tokio::spawn(trigger.run(cancel.clone()));

    shutdown_signal().await;
    cancel.cancel();

    if let Err(e) = trigger_handle.await {
        tracing::error!(error = %e, "Package trigger task failed");
    }
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
