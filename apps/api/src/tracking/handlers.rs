use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::tracking::{DailyMood, Mood, SavedAdvice, SpecialDate};
use crate::state::SharedState;
use crate::tracking::moods::MoodSummary;
use crate::tracking::special_dates::NewSpecialDate;

#[derive(Deserialize)]
pub struct MoodRequest {
    pub mood: Mood,
}

#[derive(Deserialize)]
pub struct AdviceRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct AdviceSaved {
    pub saved: bool,
}

/// GET /api/v1/special-dates
pub async fn handle_list_special_dates(State(state): State<SharedState>) -> Json<Vec<SpecialDate>> {
    Json(state.special_dates().await)
}

/// POST /api/v1/special-dates
pub async fn handle_add_special_date(
    State(state): State<SharedState>,
    Json(req): Json<NewSpecialDate>,
) -> Result<(StatusCode, Json<SpecialDate>), AppError> {
    let date = state.add_special_date(&req).await?;
    Ok((StatusCode::CREATED, Json(date)))
}

/// DELETE /api/v1/special-dates/:id
pub async fn handle_delete_special_date(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.delete_special_date(&id).await {
        return Err(AppError::NotFound(format!("Special date {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/moods
pub async fn handle_list_moods(State(state): State<SharedState>) -> Json<Vec<DailyMood>> {
    Json(state.daily_moods().await)
}

/// POST /api/v1/moods
pub async fn handle_add_mood(
    State(state): State<SharedState>,
    Json(req): Json<MoodRequest>,
) -> Json<DailyMood> {
    Json(state.add_daily_mood(req.mood).await)
}

/// GET /api/v1/moods/summary
pub async fn handle_mood_summary(State(state): State<SharedState>) -> Json<MoodSummary> {
    Json(state.mood_summary().await)
}

/// GET /api/v1/advice
pub async fn handle_list_advice(State(state): State<SharedState>) -> Json<Vec<SavedAdvice>> {
    Json(state.saved_advice().await)
}

/// POST /api/v1/advice
/// Returns `saved: false` when the same text is already bookmarked.
pub async fn handle_save_advice(
    State(state): State<SharedState>,
    Json(req): Json<AdviceRequest>,
) -> Json<AdviceSaved> {
    Json(AdviceSaved {
        saved: state.save_advice(&req.text).await,
    })
}

/// DELETE /api/v1/advice/:id
pub async fn handle_remove_advice(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.remove_advice(&id).await {
        return Err(AppError::NotFound(format!("Advice {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
