use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileUpdate};
use crate::profile::{Settings, SettingsUpdate};
use crate::state::{SharedState, UserData};

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<SharedState>) -> Json<Profile> {
    Json(state.profile().await)
}

/// PUT /api/v1/profile
pub async fn handle_save_profile(
    State(state): State<SharedState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.save_profile(&update).await?))
}

/// POST /api/v1/profile/logout
pub async fn handle_logout(State(state): State<SharedState>) -> StatusCode {
    state.logout().await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<SharedState>) -> Json<Settings> {
    Json(state.settings().await)
}

/// PUT /api/v1/settings
pub async fn handle_update_settings(
    State(state): State<SharedState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Settings>, AppError> {
    Ok(Json(state.update_settings(&update).await?))
}

/// GET /api/v1/state
/// Everything the user owns, as currently held in memory.
pub async fn handle_get_state(State(state): State<SharedState>) -> Json<UserData> {
    Json(state.snapshot().await)
}
