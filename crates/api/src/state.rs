use std::sync::Arc;

use dmf_storage::EventStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Destination for recorded business events.
    pub events: Arc<dyn EventStore>,
}
