//! Member profile endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use kinfolk_core::relationship::{Relative, Suggestion};
use kinfolk_core::{FamilyGroup, FamilyMember, KinError, MemberPatch};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(create_member))
        .route(
            "/members/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/members/{id}/relationships", get(relatives))
        .route("/members/{id}/suggestions", get(suggestions))
}

#[derive(Deserialize)]
pub struct MemberQuery {
    pub group: Option<FamilyGroup>,
}

/// GET /members?group=real
async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<FamilyMember>>, AppError> {
    Ok(Json(state.kinfolk().members(query.group).await?))
}

/// Request body for creating a member. The id is derived from the name unless given.
#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub id: Option<String>,
    pub family_group: FamilyGroup,
    #[serde(flatten)]
    pub details: MemberPatch,
}

/// POST /members
async fn create_member(
    State(state): State<AppState>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<FamilyMember>), AppError> {
    let first = req.details.first_name.clone().unwrap_or_default();
    let last = req.details.last_name.clone().unwrap_or_default();
    if first.trim().is_empty() || last.trim().is_empty() {
        return Err(KinError::Validation("first_name and last_name are required".into()).into());
    }

    let mut member = FamilyMember::new(&first, &last, req.family_group);
    if let Some(id) = req.id {
        member.id = id;
    }
    req.details.apply(&mut member);

    let member = state.kinfolk().create_member(member).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /members/:id
async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FamilyMember>, AppError> {
    Ok(Json(state.kinfolk().member(&id).await?))
}

/// PUT /members/:id - Partial update
async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<MemberPatch>,
) -> Result<Json<FamilyMember>, AppError> {
    Ok(Json(state.kinfolk().update_member(&id, patch).await?))
}

#[derive(Serialize)]
pub struct DeletedMember {
    pub relationships_removed: usize,
}

/// DELETE /members/:id - Also removes the member's relationships
async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedMember>, AppError> {
    let relationships_removed = state.kinfolk().delete_member(&id).await?;
    Ok(Json(DeletedMember {
        relationships_removed,
    }))
}

/// GET /members/:id/relationships
async fn relatives(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Relative>>, AppError> {
    Ok(Json(state.kinfolk().relatives(&id).await?))
}

/// GET /members/:id/suggestions
async fn suggestions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Suggestion>>, AppError> {
    Ok(Json(state.kinfolk().suggestions(&id).await?))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_update_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let body = json!({
            "id": "rose",
            "first_name": "Rose",
            "last_name": "Park",
            "family_group": "real",
            "gender": "female",
        });
        let (status, rose) = send(&app, "POST", "/members", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(rose["gender"], "female");

        let (status, _) = send(&app, "POST", "/members", None, Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let demo = json!({ "first_name": "Sample", "last_name": "Person", "family_group": "demo" });
        send(&app, "POST", "/members", None, Some(demo)).await;

        let patch = json!({ "nickname": "Rosie" });
        let (status, updated) = send(&app, "PUT", "/members/rose", None, Some(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["nickname"], "Rosie");
        assert_eq!(updated["first_name"], "Rose");

        let (_, real) = send(&app, "GET", "/members?group=real", None, None).await;
        assert_eq!(real.as_array().unwrap().len(), 1);

        let (status, deleted) = send(&app, "DELETE", "/members/rose", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["relationships_removed"], 0);
    }

    #[tokio::test]
    async fn test_missing_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let body = json!({ "first_name": "Cher", "family_group": "real" });
        let (status, _) = send(&app, "POST", "/members", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
