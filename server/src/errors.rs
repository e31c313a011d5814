use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Everything a handler can fail with. Domain errors keep their message;
/// internal failures are logged and answered with an opaque 500.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error(transparent)]
    Domain(#[from] db::Error),

    #[error("you do not have permission to modify this recipe")]
    Forbidden,

    #[error("authentication required")]
    Unauthorized,
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Domain(db::Error::Sqlx(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Domain(db::Error::AlreadyExists(_) | db::Error::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Domain(db::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Domain(db::Error::DataIntegrity(_) | db::Error::Sqlx(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            return (
                status,
                Json(json!({ "detail": "internal server error" })),
            )
                .into_response();
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
