pub mod calendar;
pub mod events;
pub mod members;
pub mod photos;
pub mod relationships;

use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use kinfolk_core::KinError;

use crate::state::AppState;

/// Header carrying the id of the signed-in family member.
pub const VIEWER_HEADER: &str = "x-kinfolk-user";

pub fn router(state: AppState) -> Router {
    let max_photo_bytes = state.kinfolk().config().max_photo_bytes;

    Router::new()
        .merge(calendar::router())
        .merge(events::router())
        .merge(members::router())
        .merge(relationships::router())
        .merge(photos::router(max_photo_bytes))
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert anyhow errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<KinError>() {
            Some(KinError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Some(KinError::Conflict(_)) => StatusCode::CONFLICT,
            Some(KinError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Some(KinError::Validation(_) | KinError::Recurrence(_) | KinError::Photo(_)) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// The member a request is made on behalf of, from [`VIEWER_HEADER`].
pub struct Viewer(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(VIEWER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Viewer(value.to_string()))
            .ok_or_else(|| KinError::Validation(format!("Missing {VIEWER_HEADER} header")).into())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use kinfolk_core::KinfolkConfig;
    use tower::ServiceExt;

    use super::VIEWER_HEADER;
    use crate::state::AppState;

    pub fn app(dir: &tempfile::TempDir) -> Router {
        let config = KinfolkConfig {
            data_dir: dir.path().join("data"),
            cache_dir: Some(dir.path().join("cache")),
            demo_users: vec!["demo-visitor".into()],
            ..KinfolkConfig::default()
        };
        super::router(AppState::new(config).unwrap())
    }

    /// Send one request and return the status and parsed JSON body (Null when empty).
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        viewer: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(viewer) = viewer {
            request = request.header(VIEWER_HEADER, viewer);
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{app, send};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_missing_viewer_header_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, "GET", "/calendar", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("x-kinfolk-user"));
    }

    #[tokio::test]
    async fn test_unknown_member_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, "GET", "/members/nobody", Some("alice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "member not found: nobody");
    }
}
