//! Event and RSVP endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use kinfolk_core::{CalendarEvent, EventDraft, Rsvp, RsvpStatus, RsvpSummary};

use crate::routes::{AppError, Viewer};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/rsvps", get(list_rsvps).post(respond))
}

/// GET /events - Stored events visible to the viewer
async fn list_events(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    Ok(Json(state.kinfolk().events(&viewer).await?))
}

/// POST /events - Create an event owned by the viewer
async fn create_event(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<CalendarEvent>), AppError> {
    let event = state.kinfolk().create_event(&viewer, draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events/:id
async fn get_event(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, AppError> {
    Ok(Json(state.kinfolk().event(&viewer, &id).await?))
}

/// PUT /events/:id - Owner only
async fn update_event(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> Result<Json<CalendarEvent>, AppError> {
    Ok(Json(state.kinfolk().update_event(&viewer, &id, draft).await?))
}

/// DELETE /events/:id - Owner only, RSVPs go with it
async fn delete_event(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.kinfolk().delete_event(&viewer, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct RsvpList {
    pub responses: Vec<Rsvp>,
    pub summary: RsvpSummary,
}

/// GET /events/:id/rsvps
async fn list_rsvps(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
) -> Result<Json<RsvpList>, AppError> {
    let (responses, summary) = state.kinfolk().responses(&viewer, &id).await?;
    Ok(Json(RsvpList { responses, summary }))
}

#[derive(Deserialize)]
pub struct RsvpRequest {
    pub status: RsvpStatus,
    pub note: Option<String>,
}

/// POST /events/:id/rsvps - Record the viewer's response
async fn respond(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
    Json(req): Json<RsvpRequest>,
) -> Result<Json<Rsvp>, AppError> {
    Ok(Json(
        state
            .kinfolk()
            .respond(&viewer, &id, req.status, req.note)
            .await?,
    ))
}
