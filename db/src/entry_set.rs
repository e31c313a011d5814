//! Shared mechanics of the two per-user recipe sets (favorites and the
//! shopping cart). Both tables have the same shape and the same
//! `(user_id, recipe_id)` uniqueness rule; only the table differs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{map_insert_err, Error, Result};
use crate::recipes::Recipe;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SetEntry {
    pub entry_id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub created_at: DateTime<Utc>,
}

pub(crate) async fn add(
    pool: &SqlitePool,
    table: &'static str,
    what: &'static str,
    user_id: i64,
    recipe_id: i64,
) -> Result<SetEntry> {
    let sql = format!(
        "INSERT INTO {table} (user_id, recipe_id)
         VALUES (?1, ?2)
         RETURNING entry_id, user_id, recipe_id, created_at"
    );

    sqlx::query_as::<_, SetEntry>(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await
        .map_err(|err| map_insert_err(err, what, "recipe"))
}

pub(crate) async fn remove(
    pool: &SqlitePool,
    table: &'static str,
    what: &'static str,
    user_id: i64,
    recipe_id: i64,
) -> Result<()> {
    let sql = format!("DELETE FROM {table} WHERE user_id = ?1 AND recipe_id = ?2");

    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(what));
    }

    Ok(())
}

pub(crate) async fn contains(
    pool: &SqlitePool,
    table: &'static str,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {table} WHERE user_id = ?1 AND recipe_id = ?2)"
    );

    let present = sqlx::query_scalar::<_, bool>(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;

    Ok(present)
}

/// Insertion order, oldest first. `limit` of `None` returns everything
/// (SQLite treats a negative LIMIT as unbounded).
pub(crate) async fn recipes_for_user(
    pool: &SqlitePool,
    table: &'static str,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Recipe>> {
    let sql = format!(
        "SELECT r.recipe_id, r.author_id, r.name, r.text, r.image,
                r.cooking_time, r.created_at
         FROM {table} e
         JOIN recipes r ON r.recipe_id = e.recipe_id
         WHERE e.user_id = ?1
         ORDER BY e.entry_id
         LIMIT ?2"
    );

    let recipes = sqlx::query_as::<_, Recipe>(&sql)
        .bind(user_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;

    Ok(recipes)
}
