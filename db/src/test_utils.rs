//! Helpers for tests: a fresh migrated in-memory database per call, plus
//! fixture shortcuts the test modules share.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::ingredients::Ingredient;
use crate::recipes::{IngredientAmount, Recipe, RecipeInput};
use crate::users::User;

/// A single-connection pool over an in-memory database with the schema
/// applied. One connection, because every `:memory:` connection is its own
/// database.
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

pub async fn seed_user(pool: &SqlitePool, username: &str) -> User {
    User::create(
        pool,
        username,
        &format!("{username}@example.com"),
        "Test",
        "User",
        "not-a-real-hash",
    )
    .await
    .expect("failed to seed user")
}

pub async fn seed_ingredient(pool: &SqlitePool, name: &str, unit: &str) -> Ingredient {
    Ingredient::create(pool, name, unit)
        .await
        .expect("failed to seed ingredient")
}

pub async fn seed_recipe(
    pool: &SqlitePool,
    author_id: i64,
    name: &str,
    lines: &[(i64, i64)],
) -> Recipe {
    let input = RecipeInput {
        name: name.to_string(),
        text: format!("How to make {name}."),
        image: None,
        cooking_time: 10,
        tag_ids: vec![],
        ingredients: lines
            .iter()
            .map(|&(ingredient_id, amount)| IngredientAmount {
                ingredient_id,
                amount,
            })
            .collect(),
    };

    Recipe::create(pool, author_id, &input)
        .await
        .expect("failed to seed recipe")
}
