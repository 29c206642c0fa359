//! Persisted projection of a [`BusinessEvent`].

use serde::{Deserialize, Serialize};

use crate::business_event::BusinessEvent;
use crate::types::Timestamp;

/// One row of the status table, keyed by `(PartitionKey, RowKey)` =
/// `(EntityName, EventId)`.
///
/// The row is insert-only: a second write for the same key must fail rather
/// than replace the first. `ControlNumber`, the version counters, `RecId` and
/// `EventTime` are not carried over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRecord {
    pub partition_key: String,
    pub row_key: String,
    pub business_event_id: String,
    pub project_name: String,
    pub project_description: String,
    pub execution_id: String,
    pub legal_entity: String,
    pub no_of_records: i64,
    pub no_of_created_records: i64,
    pub no_of_updated_records: i64,
    pub no_of_error_records: i64,
    pub operation_type: String,
    pub project_category: String,
    #[serde(with = "crate::json_date")]
    pub started_date_time: Timestamp,
    #[serde(with = "crate::json_date")]
    pub end_date_time: Timestamp,
    pub status: String,
}

impl EventRecord {
    /// `(PartitionKey, RowKey)`
    pub fn key(&self) -> (&str, &str) {
        (&self.partition_key, &self.row_key)
    }
}

impl From<BusinessEvent> for EventRecord {
    fn from(event: BusinessEvent) -> Self {
        Self {
            partition_key: event.entity_name,
            row_key: event.event_id,
            business_event_id: event.business_event_id,
            project_name: event.project_name,
            project_description: event.project_description,
            execution_id: event.execution_id,
            legal_entity: event.legal_entity,
            no_of_records: event.no_of_records,
            no_of_created_records: event.no_of_created_records,
            no_of_updated_records: event.no_of_updated_records,
            no_of_error_records: event.no_of_error_records,
            operation_type: event.operation_type,
            project_category: event.project_category,
            started_date_time: event.started_date_time,
            end_date_time: event.end_date_time,
            status: event.status,
        }
    }
}
