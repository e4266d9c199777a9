//! Relationship endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};

use kinfolk_core::relationship::RelationshipCategory;
use kinfolk_core::{FamilyRelationship, RelationshipType};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/relationships",
            get(list_relationships).post(create_relationship),
        )
        .route("/relationships/{id}", delete(delete_relationship))
        .route("/relationship-types", get(relationship_types))
}

/// GET /relationships
async fn list_relationships(
    State(state): State<AppState>,
) -> Result<Json<Vec<FamilyRelationship>>, AppError> {
    Ok(Json(state.kinfolk().relationships().await?))
}

/// Request body: `from_member_id` is the `relationship_type` of `to_member_id`
#[derive(Deserialize)]
pub struct CreateRelationshipRequest {
    pub from_member_id: String,
    pub to_member_id: String,
    pub relationship_type: RelationshipType,
    pub subtype: Option<String>,
    pub notes: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

#[derive(Serialize)]
pub struct CreatedRelationship {
    pub relationship: FamilyRelationship,
    pub warnings: Vec<String>,
}

/// POST /relationships - Hard rule violations are errors, soft ones come back as warnings
async fn create_relationship(
    State(state): State<AppState>,
    Json(req): Json<CreateRelationshipRequest>,
) -> Result<(StatusCode, Json<CreatedRelationship>), AppError> {
    let mut relationship =
        FamilyRelationship::new(&req.from_member_id, &req.to_member_id, req.relationship_type);
    relationship.subtype = req.subtype;
    relationship.notes = req.notes;
    relationship.start_date = req.start_date;
    relationship.end_date = req.end_date;

    let (relationship, validation) = state.kinfolk().create_relationship(relationship).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedRelationship {
            relationship,
            warnings: validation.warnings,
        }),
    ))
}

/// DELETE /relationships/:id
async fn delete_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.kinfolk().delete_relationship(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct RelationshipTypeInfo {
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    pub label: &'static str,
    pub category: RelationshipCategory,
    pub inverse: RelationshipType,
}

/// GET /relationship-types - Every type with its category and (neutral) inverse
async fn relationship_types() -> Json<Vec<RelationshipTypeInfo>> {
    Json(
        RelationshipType::ALL
            .iter()
            .map(|&kind| RelationshipTypeInfo {
                kind,
                label: kind.label(),
                category: kind.category(),
                inverse: kind.inverse(None),
            })
            .collect(),
    )
}
