//! Handler for business events posted by the ERP after an import finishes.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use dmf_core::business_event::BusinessEvent;
use dmf_core::event_record::EventRecord;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST {STATUS_ROUTE}
///
/// Parse the body as a [`BusinessEvent`], project it onto an
/// [`EventRecord`] keyed by `(EntityName, EventId)` and insert it. Responds
/// with the stored record. Anonymous: no caller authentication.
pub async fn record_event(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<EventRecord>> {
    let result = store(&state, &body).await;
    match &result {
        Ok(record) => tracing::info!(
            entity = %record.partition_key,
            event_id = %record.row_key,
            execution_id = %record.execution_id,
            status = %record.status,
            "Business event recorded"
        ),
        Err(e) => tracing::warn!(error = %e, "Business event rejected"),
    }
    result.map(Json)
}

async fn store(state: &AppState, body: &[u8]) -> AppResult<EventRecord> {
    let text = std::str::from_utf8(body)
        .map_err(|e| AppError::BadRequest(format!("Request body is not valid UTF-8: {e}")))?;
    let event = BusinessEvent::from_body(text)?;
    tracing::debug!(
        business_event_id = %event.business_event_id,
        entity = %event.entity_name,
        event_id = %event.event_id,
        "Received business event"
    );

    state.events.ensure_table().await?;

    let record = EventRecord::from(event);
    state.events.insert(&record).await?;
    Ok(record)
}
