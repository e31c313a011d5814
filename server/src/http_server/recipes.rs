use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::Query;
use db::recipes::{Recipe, RecipeFilter, RecipeInput, RecipeWithDetails};
use db::shopping_list::ShoppingList;
use db::SetEntry;
use serde::Deserialize;

use crate::current_user::CurrentUser;
use crate::errors::{ApiError, ApiResult};
use crate::http_server::pagination;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    page: Option<i64>,
    limit: Option<i64>,
    author: Option<i64>,
    /// Tag slugs; the parameter repeats (`?tags=breakfast&tags=lunch`).
    #[serde(default)]
    tags: Vec<String>,
    is_favorited: Option<i64>,
    is_in_shopping_cart: Option<i64>,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let (limit, offset) = pagination::limit_offset(params.page, params.limit);

    let mut filter = RecipeFilter {
        author_id: params.author,
        tag_slugs: params.tags,
        ..RecipeFilter::default()
    };
    if params.is_favorited == Some(1) {
        let user = user.as_ref().ok_or(ApiError::Unauthorized)?;
        filter.favorited_by = Some(user.0.user_id);
    }
    if params.is_in_shopping_cart == Some(1) {
        let user = user.as_ref().ok_or(ApiError::Unauthorized)?;
        filter.in_cart_of = Some(user.0.user_id);
    }

    let recipes = Recipe::list(&state.db, &filter, limit, offset).await?;

    Ok(Json(recipes))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RecipeInput>,
) -> ApiResult<(StatusCode, Json<RecipeWithDetails>)> {
    let recipe = Recipe::create(&state.db, user.user_id, &input).await?;
    let full = Recipe::get_full(&state.db, recipe.recipe_id)
        .await?
        .ok_or(db::Error::NotFound("recipe"))?;

    Ok((StatusCode::CREATED, Json(full)))
}

pub(crate) async fn retrieve(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> ApiResult<Json<RecipeWithDetails>> {
    let full = Recipe::get_full(&state.db, recipe_id)
        .await?
        .ok_or(db::Error::NotFound("recipe"))?;

    Ok(Json(full))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<i64>,
    Json(input): Json<RecipeInput>,
) -> ApiResult<Json<RecipeWithDetails>> {
    check_author(&state, recipe_id, user.user_id).await?;

    Recipe::update(&state.db, recipe_id, &input).await?;
    let full = Recipe::get_full(&state.db, recipe_id)
        .await?
        .ok_or(db::Error::NotFound("recipe"))?;

    Ok(Json(full))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<i64>,
) -> ApiResult<StatusCode> {
    check_author(&state, recipe_id, user.user_id).await?;

    Recipe::delete(&state.db, recipe_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn check_author(state: &AppState, recipe_id: i64, user_id: i64) -> ApiResult<()> {
    let recipe = Recipe::get_by_id(&state.db, recipe_id)
        .await?
        .ok_or(db::Error::NotFound("recipe"))?;

    if recipe.author_id != user_id {
        return Err(ApiError::Forbidden);
    }

    Ok(())
}

pub(crate) async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<SetEntry>)> {
    let entry = db::favorites::add(&state.db, user.user_id, recipe_id).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub(crate) async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<i64>,
) -> ApiResult<StatusCode> {
    db::favorites::remove(&state.db, user.user_id, recipe_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn add_to_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<SetEntry>)> {
    let entry = db::shopping_cart::add(&state.db, user.user_id, recipe_id).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub(crate) async fn remove_from_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<i64>,
) -> ApiResult<StatusCode> {
    db::shopping_cart::remove(&state.db, user.user_id, recipe_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Streams the aggregated shopping list as a text attachment.
pub(crate) async fn download_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Response> {
    let list = ShoppingList::compute(&state.db, user.user_id).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=shopping-list.txt",
        ),
    ];

    Ok((headers, list.render()).into_response())
}
