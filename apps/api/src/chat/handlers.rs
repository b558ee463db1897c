use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::chat::SendOutcome;
use crate::errors::AppError;
use crate::models::chat::ChatMessage;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SendRequest {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub messages: Vec<ChatMessage>,
    pub is_typing: bool,
}

/// GET /api/v1/chat/:conversation
pub async fn handle_get_transcript(
    State(state): State<SharedState>,
    Path(conversation): Path<String>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let messages = state.transcript(&conversation).await?;
    Ok(Json(TranscriptResponse {
        messages,
        is_typing: state.is_typing(),
    }))
}

/// DELETE /api/v1/chat/:conversation
pub async fn handle_clear_transcript(
    State(state): State<SharedState>,
    Path(conversation): Path<String>,
) -> Result<StatusCode, AppError> {
    state.clear_transcript(&conversation).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chat/:conversation/messages
/// A failed model call still answers 200, with the reply flagged `isError`.
pub async fn handle_send_message(
    State(state): State<SharedState>,
    Path(conversation): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendOutcome>, AppError> {
    Ok(Json(state.send_message(&conversation, &req.text).await?))
}
