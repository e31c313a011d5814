use axum::extract::{Path, State};
use axum::Json;
use db::tags::Tag;

use crate::errors::ApiResult;
use crate::AppState;

pub(crate) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(Tag::list(&state.db).await?))
}

pub(crate) async fn retrieve(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> ApiResult<Json<Tag>> {
    let tag = Tag::get_by_id(&state.db, tag_id)
        .await?
        .ok_or(db::Error::NotFound("tag"))?;

    Ok(Json(tag))
}
