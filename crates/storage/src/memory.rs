//! In-process [`EventStore`] for local runs and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dmf_core::event_record::EventRecord;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::event_store::EventStore;
use crate::table::validate_key;

/// Rows keyed by `(PartitionKey, RowKey)`, with the same insert-only and key
/// rules as the table service.
#[derive(Default)]
pub struct MemoryEventStore {
    rows: RwLock<BTreeMap<(String, String), EventRecord>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, partition_key: &str, row_key: &str) -> Option<EventRecord> {
        self.rows
            .read()
            .await
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn ensure_table(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn insert(&self, record: &EventRecord) -> Result<(), StorageError> {
        validate_key("PartitionKey", &record.partition_key)?;
        validate_key("RowKey", &record.row_key)?;

        let key = (record.partition_key.clone(), record.row_key.clone());
        let mut rows = self.rows.write().await;
        if rows.contains_key(&key) {
            return Err(StorageError::EntityExists {
                partition_key: key.0,
                row_key: key.1,
            });
        }
        rows.insert(key, record.clone());
        Ok(())
    }
}
