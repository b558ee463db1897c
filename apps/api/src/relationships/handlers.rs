use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::relationship::{Relationship, RelationshipPatch, RelationshipType};
use crate::onboarding::draft::RelationshipDraft;
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub recent_first: bool,
}

#[derive(Serialize)]
pub struct RelationshipTypeInfo {
    pub id: RelationshipType,
    pub label: &'static str,
    pub emoji: &'static str,
}

/// GET /api/v1/relationship-types
pub async fn handle_list_types() -> Json<Vec<RelationshipTypeInfo>> {
    Json(
        RelationshipType::ALL
            .into_iter()
            .map(|kind| RelationshipTypeInfo {
                id: kind,
                label: kind.label(),
                emoji: kind.emoji(),
            })
            .collect(),
    )
}

/// GET /api/v1/relationships
pub async fn handle_list_relationships(
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
) -> Json<Vec<Relationship>> {
    if params.recent_first {
        Json(state.relationships_recent_first().await)
    } else {
        Json(state.relationships().await)
    }
}

/// POST /api/v1/relationships
pub async fn handle_add_relationship(
    State(state): State<SharedState>,
    Json(req): Json<RelationshipDraft>,
) -> Result<(StatusCode, Json<Relationship>), AppError> {
    let relationship = state.add_relationship(&req).await?;
    Ok((StatusCode::CREATED, Json(relationship)))
}

/// PATCH /api/v1/relationships/:id
pub async fn handle_update_relationship(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<RelationshipPatch>,
) -> Result<Json<Relationship>, AppError> {
    Ok(Json(state.update_relationship(&id, &patch).await?))
}

/// DELETE /api/v1/relationships/:id
pub async fn handle_delete_relationship(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.delete_relationship(&id).await {
        return Err(AppError::NotFound(format!("Relationship {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
