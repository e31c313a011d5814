use axum::extract::{Path, Query, State};
use axum::Json;
use db::ingredients::Ingredient;
use serde::Deserialize;

use crate::errors::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    name: Option<String>,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = match params.name.as_deref() {
        Some(prefix) if !prefix.is_empty() => {
            Ingredient::search_by_prefix(&state.db, prefix).await?
        }
        _ => Ingredient::list(&state.db).await?,
    };

    Ok(Json(ingredients))
}

pub(crate) async fn retrieve(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> ApiResult<Json<Ingredient>> {
    let ingredient = Ingredient::get_by_id(&state.db, ingredient_id)
        .await?
        .ok_or(db::Error::NotFound("ingredient"))?;

    Ok(Json(ingredient))
}
