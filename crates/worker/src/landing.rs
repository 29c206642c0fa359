//! Landing-directory scanner.
//!
//! A file is handed out once it has been seen with the same size and
//! modification time on two consecutive scans (so a copy still in progress
//! is not picked up), and then never again for the same (name, size, mtime)
//! while that file stays in the directory. A receipt is dropped once its file
//! is gone or has changed, so a package that lands again triggers again.
//! Files whose name is not `{name}.zip` are ignored.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dmf_core::import::package_name_from_path;

/// A package ready to be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandedPackage {
    /// File stem, sent to the ERP as the unique file name.
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Snapshot {
    size: u64,
    modified: Option<SystemTime>,
}

/// Tracks what has been observed and handed out.
pub struct LandingWatcher {
    dir: PathBuf,
    pending: HashMap<PathBuf, Snapshot>,
    receipts: HashSet<(PathBuf, Snapshot)>,
}

impl LandingWatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pending: HashMap::new(),
            receipts: HashSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scan the directory once and return the packages that became ready.
    pub async fn scan(&mut self) -> std::io::Result<Vec<LandedPackage>> {
        let mut ready = Vec::new();
        let mut seen = HashMap::new();
        let mut present = HashSet::new();
        let mut unreadable = HashSet::new();

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            let Ok(name) = package_name_from_path(&path) else {
                continue;
            };

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Unable to stat landed file");
                    unreadable.insert(path);
                    continue;
                }
            };

            let snapshot = Snapshot {
                size: metadata.len(),
                modified: metadata.modified().ok(),
            };

            let receipt = (path.clone(), snapshot.clone());
            present.insert(receipt.clone());
            if self.receipts.contains(&receipt) {
                continue;
            }

            if self.pending.get(&path) == Some(&snapshot) {
                self.receipts.insert(receipt);
                ready.push(LandedPackage {
                    name,
                    path: path.clone(),
                });
            } else {
                seen.insert(path, snapshot);
            }
        }

        // Files that vanished or became ready drop out of `pending`.
        self.pending = seen;
        // A file that could not be stat'ed keeps its receipt until next scan.
        self.receipts
            .retain(|receipt| present.contains(receipt) || unreadable.contains(&receipt.0));
        ready.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ready)
    }

    /// Number of handed-out files still held as receipts.
    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_is_ready_on_second_stable_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Customers.zip"), b"PK").unwrap();

        let mut watcher = LandingWatcher::new(dir.path());

        assert!(watcher.scan().await.unwrap().is_empty());

        let ready = watcher.scan().await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].name, "Customers");
        assert_eq!(ready[0].path, dir.path().join("Customers.zip"));
    }

    #[tokio::test]
    async fn file_is_handed_out_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Customers.zip"), b"PK").unwrap();

        let mut watcher = LandingWatcher::new(dir.path());
        watcher.scan().await.unwrap();
        assert_eq!(watcher.scan().await.unwrap().len(), 1);

        assert!(watcher.scan().await.unwrap().is_empty());
        assert!(watcher.scan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn growing_file_waits_until_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Vendors.zip");
        std::fs::write(&path, b"PK").unwrap();

        let mut watcher = LandingWatcher::new(dir.path());
        watcher.scan().await.unwrap();

        std::fs::write(&path, b"PK\x03\x04more").unwrap();
        assert!(watcher.scan().await.unwrap().is_empty());

        assert_eq!(watcher.scan().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_package_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("Customers.csv"), b"a,b").unwrap();
        std::fs::create_dir(dir.path().join("archive.zip")).unwrap();

        let mut watcher = LandingWatcher::new(dir.path());
        watcher.scan().await.unwrap();
        assert!(watcher.scan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn receipt_is_dropped_when_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = LandingWatcher::new(dir.path());

        for i in 0..20 {
            let path = dir.path().join(format!("Batch{i}.zip"));
            std::fs::write(&path, b"PK").unwrap();
            watcher.scan().await.unwrap();
            assert_eq!(watcher.scan().await.unwrap().len(), 1);
            assert_eq!(watcher.receipt_count(), 1);

            std::fs::remove_file(&path).unwrap();
            watcher.scan().await.unwrap();
            assert_eq!(watcher.receipt_count(), 0);
        }
    }

    #[tokio::test]
    async fn package_landing_again_triggers_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Customers.zip");
        std::fs::write(&path, b"PK").unwrap();

        let mut watcher = LandingWatcher::new(dir.path());
        watcher.scan().await.unwrap();
        assert_eq!(watcher.scan().await.unwrap().len(), 1);

        std::fs::remove_file(&path).unwrap();
        assert!(watcher.scan().await.unwrap().is_empty());

        std::fs::write(&path, b"PK").unwrap();
        watcher.scan().await.unwrap();
        let ready = watcher.scan().await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].name, "Customers");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = LandingWatcher::new(dir.path().join("nope"));
        assert!(watcher.scan().await.is_err());
    }
}
