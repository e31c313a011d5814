use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use db::follows::FollowEntry;
use db::users::User;
use serde::Deserialize;

use crate::current_user::CurrentUser;
use crate::errors::ApiResult;
use crate::http_server::pagination;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    page: Option<i64>,
    limit: Option<i64>,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<User>>> {
    let (limit, offset) = pagination::limit_offset(params.page, params.limit);

    Ok(Json(User::list(&state.db, limit, offset).await?))
}

pub(crate) async fn retrieve(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = User::get_by_id(&state.db, user_id)
        .await?
        .ok_or(db::Error::NotFound("user"))?;

    Ok(Json(user))
}

pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub(crate) async fn subscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(author_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<FollowEntry>)> {
    let entry = FollowEntry::create(&state.db, user.user_id, author_id).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub(crate) async fn unsubscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(author_id): Path<i64>,
) -> ApiResult<StatusCode> {
    FollowEntry::delete(&state.db, user.user_id, author_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn subscriptions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(
        FollowEntry::authors_for_user(&state.db, user.user_id).await?,
    ))
}
