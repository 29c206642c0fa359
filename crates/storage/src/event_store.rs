//! Persistence seam for business-event rows.

use async_trait::async_trait;
use dmf_core::config::TableStorageConfig;
use dmf_core::event_record::EventRecord;

use crate::error::StorageError;
use crate::table::{validate_table_name, TableClient, TableEntity};

/// Insert-only store of [`EventRecord`]s keyed by `(PartitionKey, RowKey)`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Make sure the destination exists. Idempotent.
    async fn ensure_table(&self) -> Result<(), StorageError>;

    /// Insert `record`. A second insert for the same key must fail with
    /// [`StorageError::EntityExists`] and leave the first row untouched.
    async fn insert(&self, record: &EventRecord) -> Result<(), StorageError>;
}

/// [`EventStore`] backed by an Azure Storage table.
#[derive(Debug)]
pub struct TableEventStore {
    client: TableClient,
    table_name: String,
}

impl TableEventStore {
    pub fn new(client: reqwest::Client, config: &TableStorageConfig) -> Result<Self, StorageError> {
        validate_table_name(&config.table_name)?;
        Ok(Self {
            client: TableClient::new(client, config)?,
            table_name: config.table_name.clone(),
        })
    }
}

#[async_trait]
impl EventStore for TableEventStore {
    async fn ensure_table(&self) -> Result<(), StorageError> {
        self.client.create_table_if_not_exists(&self.table_name).await
    }

    async fn insert(&self, record: &EventRecord) -> Result<(), StorageError> {
        self.client
            .insert_entity(&self.table_name, &to_entity(record))
            .await
    }
}

/// Map a record onto the table wire shape.
pub fn to_entity(record: &EventRecord) -> TableEntity {
    TableEntity::new(&record.partition_key, &record.row_key)
        .string("BusinessEventId", &record.business_event_id)
        .string("ProjectName", &record.project_name)
        .string("ProjectDescription", &record.project_description)
        .string("ExecutionId", &record.execution_id)
        .string("LegalEntity", &record.legal_entity)
        .int64("NoOfRecords", record.no_of_records)
        .int64("NoOfCreatedRecords", record.no_of_created_records)
        .int64("NoOfUpdatedRecords", record.no_of_updated_records)
        .int64("NoOfErrorRecords", record.no_of_error_records)
        .string("OperationType", &record.operation_type)
        .string("ProjectCategory", &record.project_category)
        .datetime("StartedDateTime", record.started_date_time)
        .datetime("EndDateTime", record.end_date_time)
        .string("Status", &record.status)
}
