//! Merged calendar endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use kinfolk_core::DateRange;
use kinfolk_core::calendar::CalendarView;

use crate::routes::{AppError, Viewer};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar", get(calendar))
        .route("/calendar.ics", get(calendar_ics))
}

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD`, both optional
#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, AppError> {
        Ok(DateRange::from_args(self.from.as_deref(), self.to.as_deref())?)
    }
}

/// GET /calendar - Events the viewer can see, recurring events expanded
async fn calendar(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CalendarView>, AppError> {
    let view = state.kinfolk().calendar(&viewer, &query.range()?).await?;
    Ok(Json(view))
}

/// GET /calendar.ics - The same view as an iCalendar document
async fn calendar_ics(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let ics = state.kinfolk().export_ics(&viewer, &query.range()?).await?;
    Ok(([(header::CONTENT_TYPE, "text/calendar; charset=utf-8")], ics))
}
