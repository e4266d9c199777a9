//! Photo upload and retrieval endpoints

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use kinfolk_core::photo::Photo;

use crate::routes::{AppError, Viewer};
use crate::state::AppState;

/// Room for request overhead on top of the photo itself.
const BODY_SLACK: usize = 64 * 1024;

pub fn router(max_photo_bytes: u64) -> Router<AppState> {
    let limit = usize::try_from(max_photo_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_SLACK);

    Router::new()
        .route("/photos", get(list_photos).post(upload_photo))
        .route("/photos/{*key}", get(get_photo))
        .layer(DefaultBodyLimit::max(limit))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub prefix: Option<String>,
}

/// GET /photos?prefix=alice/ - Photos from the viewer's family group
async fn list_photos(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Photo>>, AppError> {
    Ok(Json(
        state
            .kinfolk()
            .photos(&viewer, query.prefix.as_deref())
            .await?,
    ))
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub caption: Option<String>,
}

/// POST /photos?caption=... - Raw image body, type taken from Content-Type
async fn upload_photo(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Photo>), AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let photo = state
        .kinfolk()
        .upload_photo(&viewer, content_type, &body, query.caption)
        .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

#[derive(Deserialize)]
pub struct GetQuery {
    #[serde(default)]
    pub download: bool,
}

/// GET /photos/*key - Metadata, or the image itself with `?download=true`
async fn get_photo(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Response, AppError> {
    if query.download {
        let (photo, bytes) = state.kinfolk().photo_data(&viewer, &key).await?;
        return Ok(([(header::CONTENT_TYPE, photo.content_type)], bytes).into_response());
    }

    Ok(Json(state.kinfolk().photo(&viewer, &key).await?).into_response())
}
