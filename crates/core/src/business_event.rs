//! Inbound business-event payload posted by the ERP when an import finishes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// A completion notice for one data-management execution.
///
/// Field names match the ERP's PascalCase payload. Unknown fields are ignored
/// and missing or `null` fields take their default value; there is no
/// required-field validation at this level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BusinessEvent {
    #[serde(deserialize_with = "nullable")]
    pub business_event_id: String,
    #[serde(deserialize_with = "nullable")]
    pub control_number: i64,
    #[serde(with = "crate::json_date")]
    pub end_date_time: Timestamp,
    #[serde(deserialize_with = "nullable")]
    pub entity_name: String,
    #[serde(deserialize_with = "nullable")]
    pub event_id: String,
    #[serde(deserialize_with = "nullable")]
    pub event_time: String,
    #[serde(deserialize_with = "nullable")]
    pub execution_id: String,
    #[serde(deserialize_with = "nullable")]
    pub project_name: String,
    #[serde(deserialize_with = "nullable")]
    pub project_description: String,
    #[serde(deserialize_with = "nullable")]
    pub legal_entity: String,
    #[serde(deserialize_with = "nullable")]
    pub major_version: i64,
    #[serde(deserialize_with = "nullable")]
    pub minor_version: i64,
    #[serde(deserialize_with = "nullable")]
    pub no_of_created_records: i64,
    #[serde(deserialize_with = "nullable")]
    pub no_of_records: i64,
    #[serde(deserialize_with = "nullable")]
    pub no_of_updated_records: i64,
    #[serde(deserialize_with = "nullable")]
    pub no_of_error_records: i64,
    #[serde(deserialize_with = "nullable")]
    pub operation_type: String,
    #[serde(deserialize_with = "nullable")]
    pub project_category: String,
    #[serde(deserialize_with = "nullable")]
    pub rec_id: i64,
    #[serde(with = "crate::json_date")]
    pub started_date_time: Timestamp,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
}

impl BusinessEvent {
    /// Parse a raw request body. A blank body is rejected before any JSON
    /// parsing happens.
    pub fn from_body(body: &str) -> Result<Self, CoreError> {
        if body.trim().is_empty() {
            return Err(CoreError::Validation("Empty request body".to_string()));
        }

        serde_json::from_str(body)
            .map_err(|e| CoreError::Validation(format!("Malformed business event: {e}")))
    }
}

/// `null` becomes `T::default()`.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn parses_minimal_payload() {
        let event = BusinessEvent::from_body(
            r#"{
                "EntityName": "Customers",
                "EventId": "E1",
                "NoOfRecords": 10,
                "NoOfCreatedRecords": 10,
                "Status": "Success",
                "StartedDateTime": "2023-01-01T00:00:00Z",
                "EndDateTime": "2023-01-01T00:05:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(event.entity_name, "Customers");
        assert_eq!(event.event_id, "E1");
        assert_eq!(event.no_of_records, 10);
        assert_eq!(event.no_of_created_records, 10);
        assert_eq!(event.no_of_error_records, 0);
        assert_eq!(event.status, "Success");
        assert_eq!(
            event.end_date_time,
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 5, 0).unwrap()
        );
        assert_eq!(event.business_event_id, "");
    }

    #[test]
    fn parses_erp_shaped_payload() {
        let event = BusinessEvent::from_body(
            r#"{
                "BusinessEventId": "DMFExecutionCompleted",
                "ControlNumber": 5637146826,
                "EndDateTime": "/Date(1672531500000)/",
                "EntityName": "Customers V3",
                "EventId": "7B1E7A0E-5A57-4E5B-9D4C-0F1B8C36C9D1",
                "EventTime": "/Date(1672531500000)/",
                "ExecutionId": "CustomerImport-2023-01-01T00:00:00-1",
                "LegalEntity": "USMF",
                "MajorVersion": 0,
                "MinorVersion": 0,
                "NoOfCreatedRecords": 8,
                "NoOfErrorRecords": 1,
                "NoOfRecords": 10,
                "NoOfUpdatedRecords": 1,
                "OperationType": "Import",
                "ProjectCategory": "Project",
                "ProjectDescription": null,
                "ProjectName": "CustomerImport",
                "RecId": 5637148076,
                "StartedDateTime": "/Date(1672531200000)/",
                "Status": "PartiallySucceeded",
                "SomethingNew": {"nested": true}
            }"#,
        )
        .unwrap();

        assert_eq!(event.control_number, 5_637_146_826);
        assert_eq!(event.rec_id, 5_637_148_076);
        assert_eq!(event.project_description, "");
        assert_eq!(event.event_time, "/Date(1672531500000)/");
        assert_eq!(
            event.started_date_time,
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_timestamps_default_to_epoch() {
        let event = BusinessEvent::from_body(r#"{"EntityName":"Vendors"}"#).unwrap();
        assert_eq!(event.started_date_time, Timestamp::default());
        assert_eq!(event.event_id, "");
    }

    #[test]
    fn empty_body_is_rejected() {
        let err = BusinessEvent::from_body("  \n").unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg == "Empty request body");
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = BusinessEvent::from_body("[1,2,3]").unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.starts_with("Malformed business event"));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let err = BusinessEvent::from_body(r#"{"NoOfRecords":"ten"}"#).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }
}
