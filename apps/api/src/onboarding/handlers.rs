use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::profile::ProfileUpdate;
use crate::models::relationship::Relationship;
use crate::onboarding::draft::{DraftUpdate, DraftView};
use crate::onboarding::{OnboardingOutcome, OnboardingRoute, OnboardingSnapshot};
use crate::state::SharedState;

#[derive(Serialize)]
pub struct RouteResponse {
    pub route: OnboardingRoute,
    #[serde(flatten)]
    pub snapshot: OnboardingSnapshot,
}

/// GET /api/v1/onboarding/route
pub async fn handle_get_route(State(state): State<SharedState>) -> Json<RouteResponse> {
    let snapshot = state.onboarding_snapshot().await;
    Json(RouteResponse {
        route: crate::onboarding::resolve_route(&snapshot),
        snapshot,
    })
}

/// GET /api/v1/onboarding/draft
pub async fn handle_get_draft(State(state): State<SharedState>) -> Json<DraftView> {
    Json(state.draft())
}

/// PATCH /api/v1/onboarding/draft
pub async fn handle_update_draft(
    State(state): State<SharedState>,
    Json(update): Json<DraftUpdate>,
) -> Json<DraftView> {
    Json(state.update_draft(&update))
}

/// POST /api/v1/onboarding/draft/new
pub async fn handle_begin_new(State(state): State<SharedState>) -> Json<DraftView> {
    Json(state.begin_new_relationship())
}

/// POST /api/v1/onboarding/draft/edit/:id
pub async fn handle_begin_edit(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DraftView>, AppError> {
    Ok(Json(state.begin_edit_relationship(&id).await?))
}

/// POST /api/v1/onboarding/draft/profile
pub async fn handle_begin_profile_edit(State(state): State<SharedState>) -> Json<DraftView> {
    Json(state.begin_profile_edit())
}

/// POST /api/v1/onboarding/draft/commit
pub async fn handle_commit_draft(
    State(state): State<SharedState>,
) -> Result<Json<Relationship>, AppError> {
    Ok(Json(state.commit_draft().await?))
}

/// POST /api/v1/onboarding/complete
pub async fn handle_complete(
    State(state): State<SharedState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<OnboardingOutcome>, AppError> {
    Ok(Json(state.complete_onboarding(&update).await?))
}
