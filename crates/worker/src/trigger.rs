//! Poll loop that turns landed files into import invocations.

use std::sync::Arc;
use std::time::Duration;

use dmf_core::config::ErpConfig;
use dmf_core::import::ImportRequest;
use dmf_pipeline::{ImportOutcome, PackageImporter};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::landing::{LandedPackage, LandingWatcher};

/// Background service feeding the importer from the landing directory.
///
/// Each ready package becomes its own task; invocations are independent and
/// may overlap.
pub struct PackageTrigger {
    importer: Arc<PackageImporter>,
    erp: Arc<ErpConfig>,
    watcher: LandingWatcher,
    poll_interval: Duration,
    tracker: TaskTracker,
}

impl PackageTrigger {
    pub fn new(
        importer: Arc<PackageImporter>,
        erp: Arc<ErpConfig>,
        watcher: LandingWatcher,
        poll_interval: Duration,
    ) -> Self {
        Self {
            importer,
            erp,
            watcher,
            poll_interval,
            tracker: TaskTracker::new(),
        }
    }

    /// Run until `cancel` fires, then wait for in-flight imports to finish.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);
        tracing::info!(
            dir = %self.watcher.dir().display(),
            interval_secs = self.poll_interval.as_secs(),
            "Package trigger started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Package trigger cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.poll().await;
                }
            }
        }

        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!("In-flight imports finished");
    }

    /// One scan; spawns an import task per ready package.
    async fn poll(&mut self) {
        let ready = match self.watcher.scan().await {
            Ok(ready) => ready,
            Err(e) => {
                tracing::error!(
                    dir = %self.watcher.dir().display(),
                    error = %e,
                    "Failed to scan landing directory"
                );
                return;
            }
        };

        if !ready.is_empty() {
            tracing::debug!(
                ready = ready.len(),
                receipts = self.watcher.receipt_count(),
                "Packages ready for import"
            );
        }

        for package in ready {
            let importer = Arc::clone(&self.importer);
            let erp = Arc::clone(&self.erp);
            self.tracker.spawn(async move {
                invoke(&importer, &erp, package).await;
            });
        }
    }
}

/// One trigger invocation: read the landed file and run the import. Every
/// failure ends up logged in the returned outcome.
pub async fn invoke(
    importer: &PackageImporter,
    erp: &ErpConfig,
    package: LandedPackage,
) -> ImportOutcome {
    tracing::info!(package = %package.name, path = %package.path.display(), "Package landed");

    let payload = match tokio::fs::read(&package.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(package = %package.name, error = %e, "Unable to read landed package");
            return ImportOutcome::Failed {
                package: package.name,
                reason: format!("Unable to read landed package: {e}"),
            };
        }
    };

    importer
        .run(ImportRequest::new(package.name, payload, erp))
        .await
}
