use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use db::users::{AuthToken, User};
use serde_json::json;

use crate::AppState;

/// The authenticated caller, resolved from `Authorization: Token <token>`.
/// Handlers that take this extractor reject unauthenticated requests.
pub(crate) struct CurrentUser(pub User);

pub(crate) enum CurrentUserError {
    MissingToken,
    InvalidToken,
    Db(db::Error),
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = CurrentUserError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(CurrentUserError::MissingToken)?
            .to_str()
            .map_err(|_| CurrentUserError::InvalidToken)?;

        let token = header_value
            .strip_prefix("Token ")
            .ok_or(CurrentUserError::InvalidToken)?;

        let user = AuthToken::resolve(&state.db, token)
            .await
            .map_err(CurrentUserError::Db)?
            .ok_or(CurrentUserError::InvalidToken)?;

        Ok(Self(user))
    }
}

/// Public routes whose behavior is refined by a logged-in caller (the
/// `is_favorited` / `is_in_shopping_cart` feed filters) take
/// `Option<CurrentUser>`: no header means anonymous, a bad header is still
/// rejected.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = CurrentUserError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<AppState>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(CurrentUserError::MissingToken) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl IntoResponse for CurrentUserError {
    fn into_response(self) -> Response {
        match self {
            CurrentUserError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "authentication credentials were not provided" })),
            )
                .into_response(),
            CurrentUserError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "invalid token" })),
            )
                .into_response(),
            CurrentUserError::Db(err) => {
                tracing::error!(error = %err, "failed to resolve current user");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
