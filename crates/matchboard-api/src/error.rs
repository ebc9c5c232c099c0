use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matchboard_db::StoreError;
use serde_json::json;
use tracing::error;

/// Transport-level rendering of engine failures. Error bodies keep the
/// `{"status": "error", "message": ...}` envelope so clients can show a
/// specific message per conflict.
pub enum ApiError {
    Store(StoreError),
    Unauthorized(&'static str),
    Internal(anyhow::Error),
}

/// Run a blocking engine call off the async runtime. The store serializes
/// access behind a connection mutex, so even small mutations can wait on a
/// long read and must not park a tokio worker.
pub async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {e}")))?
        .map_err(ApiError::from)
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(StoreError::Validation(m)) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            ApiError::Store(StoreError::Authorization(m)) => (StatusCode::FORBIDDEN, m),
            ApiError::Store(StoreError::NotFound(m)) => (StatusCode::NOT_FOUND, m),
            ApiError::Store(StoreError::Conflict(m)) => (StatusCode::CONFLICT, m),
            ApiError::Store(StoreError::QuotaExceeded(m)) => (StatusCode::TOO_MANY_REQUESTS, m),
            ApiError::Store(err) => {
                error!("store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.to_string()),
            ApiError::Internal(err) => {
                error!("internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({ "status": "error", "message": message })),
        )
            .into_response()
    }
}
