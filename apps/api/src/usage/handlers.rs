use axum::{extract::State, Json};

use crate::state::SharedState;
use crate::usage::UsageSnapshot;

/// GET /api/v1/usage
pub async fn handle_get_usage(State(state): State<SharedState>) -> Json<UsageSnapshot> {
    Json(state.usage.snapshot())
}
