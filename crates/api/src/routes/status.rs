use axum::routing::post;
use axum::Router;

use crate::handlers::status;
use crate::state::AppState;

/// Mount the business-event receiver at `route`.
///
/// ```text
/// POST {route}    record_event
/// ```
pub fn router(route: &str) -> Router<AppState> {
    Router::new().route(route, post(status::record_event))
}
