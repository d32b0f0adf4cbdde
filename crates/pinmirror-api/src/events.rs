use axum::{Json, extract::State, http::StatusCode};
use tracing::debug;

use pinmirror_types::events::InboundEvent;

use crate::state::AppState;

/// Accept a platform event and handle it in the background.
pub async fn ingest(State(state): State<AppState>, Json(event): Json<InboundEvent>) -> StatusCode {
    debug!(kind = event.kind(), "Event received");
    // Handlers are fire-and-forget; the task outlives the request.
    drop(state.events.spawn(event));
    StatusCode::ACCEPTED
}
