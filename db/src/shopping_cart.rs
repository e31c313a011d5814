//! Per-user set of recipes queued for purchase. This is the input of the
//! shopping-list aggregation in [`crate::shopping_list`].

use sqlx::SqlitePool;

use crate::entry_set::{self, SetEntry};
use crate::error::Result;
use crate::recipes::Recipe;

const TABLE: &str = "shopping_cart";

pub async fn add(pool: &SqlitePool, user_id: i64, recipe_id: i64) -> Result<SetEntry> {
    entry_set::add(pool, TABLE, "cart entry", user_id, recipe_id).await
}

pub async fn remove(pool: &SqlitePool, user_id: i64, recipe_id: i64) -> Result<()> {
    entry_set::remove(pool, TABLE, "cart entry", user_id, recipe_id).await
}

pub async fn contains(pool: &SqlitePool, user_id: i64, recipe_id: i64) -> Result<bool> {
    entry_set::contains(pool, TABLE, user_id, recipe_id).await
}

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Recipe>> {
    entry_set::recipes_for_user(pool, TABLE, user_id, limit).await
}
