use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::Result;

/// Static reference data. Rows are never mutated once a recipe line points
/// at them; `(name, measurement_unit)` is deliberately not unique because
/// the imported catalog contains duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Ingredient {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Self> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "INSERT INTO ingredients (name, measurement_unit)
             VALUES (?1, ?2)
             RETURNING ingredient_id, name, measurement_unit",
        )
        .bind(name)
        .bind(measurement_unit)
        .fetch_one(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_by_id(pool: &SqlitePool, ingredient_id: i64) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT ingredient_id, name, measurement_unit
             FROM ingredients
             WHERE ingredient_id = ?1",
        )
        .bind(ingredient_id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT ingredient_id, name, measurement_unit
             FROM ingredients
             ORDER BY name, ingredient_id",
        )
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Case-insensitive prefix search, the only lookup the recipe editor
    /// needs. `%` and `_` in the prefix match literally, not as wildcards.
    pub async fn search_by_prefix(pool: &SqlitePool, prefix: &str) -> Result<Vec<Self>> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");

        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT ingredient_id, name, measurement_unit
             FROM ingredients
             WHERE name LIKE ?1 || '%' ESCAPE '\\'
             ORDER BY name, ingredient_id",
        )
        .bind(escaped)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }
}
