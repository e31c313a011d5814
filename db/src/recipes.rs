use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{Error, Result};
use crate::tags::Tag;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Recipe {
    pub recipe_id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    /// Opaque reference into image storage; never interpreted here.
    pub image: Option<String>,
    pub cooking_time: i64,
    pub created_at: DateTime<Utc>,
}

pub(crate) const RECIPE_COLUMNS: &str =
    "recipe_id, author_id, name, text, image, cooking_time, created_at";

/// One `(ingredient, amount)` pair of a create/update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IngredientAmount {
    pub ingredient_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    pub cooking_time: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeInput {
    /// The checks the storage layer cannot phrase as constraints: a recipe
    /// needs at least one line, and a repeated ingredient id is rejected
    /// rather than merged so the composite-key invariant stays visible to
    /// the caller.
    fn validate(&self) -> Result<()> {
        if self.cooking_time <= 0 {
            return Err(Error::validation("cooking_time must be positive"));
        }
        if self.ingredients.is_empty() {
            return Err(Error::validation("a recipe needs at least one ingredient"));
        }

        let mut seen = HashSet::new();
        for line in &self.ingredients {
            if line.amount <= 0 {
                return Err(Error::validation(format!(
                    "amount for ingredient {} must be positive",
                    line.ingredient_id
                )));
            }
            if !seen.insert(line.ingredient_id) {
                return Err(Error::validation(format!(
                    "ingredient {} is listed twice",
                    line.ingredient_id
                )));
            }
        }

        Ok(())
    }
}

/// An ingredient line resolved against the catalog, as served to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct IngredientLine {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeWithDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<IngredientLine>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Default, Clone)]
pub struct RecipeFilter {
    pub author_id: Option<i64>,
    pub tag_slugs: Vec<String>,
    pub favorited_by: Option<i64>,
    pub in_cart_of: Option<i64>,
}

impl Recipe {
    pub async fn create(pool: &SqlitePool, author_id: i64, input: &RecipeInput) -> Result<Self> {
        input.validate()?;

        let mut tx = pool.begin().await?;

        let sql = format!(
            "INSERT INTO recipes (author_id, name, text, image, cooking_time)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {RECIPE_COLUMNS}"
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(author_id)
            .bind(&input.name)
            .bind(&input.text)
            .bind(&input.image)
            .bind(input.cooking_time)
            .fetch_one(&mut *tx)
            .await?;

        write_associations(&mut tx, recipe.recipe_id, input).await?;

        tx.commit().await?;

        Ok(recipe)
    }

    /// Replaces the whole recipe, lines and tags included. The line set is
    /// deleted and recreated rather than diffed; the transaction makes
    /// that an all-or-nothing swap.
    pub async fn update(pool: &SqlitePool, recipe_id: i64, input: &RecipeInput) -> Result<Self> {
        input.validate()?;

        let mut tx = pool.begin().await?;

        let sql = format!(
            "UPDATE recipes
             SET name = ?2, text = ?3, image = ?4, cooking_time = ?5
             WHERE recipe_id = ?1
             RETURNING {RECIPE_COLUMNS}"
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(recipe_id)
            .bind(&input.name)
            .bind(&input.text)
            .bind(&input.image)
            .bind(input.cooking_time)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(Error::NotFound("recipe"))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        write_associations(&mut tx, recipe_id, input).await?;

        tx.commit().await?;

        Ok(recipe)
    }

    /// Cascades through lines, tag links, favorites and cart entries; the
    /// schema owns that cleanup.
    pub async fn delete(pool: &SqlitePool, recipe_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = ?1")
            .bind(recipe_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("recipe"));
        }

        Ok(())
    }

    pub async fn get_by_id(pool: &SqlitePool, recipe_id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE recipe_id = ?1");

        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(recipe_id)
            .fetch_optional(pool)
            .await?;

        Ok(recipe)
    }

    pub async fn get_full(pool: &SqlitePool, recipe_id: i64) -> Result<Option<RecipeWithDetails>> {
        let Some(recipe) = Self::get_by_id(pool, recipe_id).await? else {
            return Ok(None);
        };

        let ingredients = sqlx::query_as::<_, IngredientLine>(
            "SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
             FROM recipe_ingredients ri
             JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
             WHERE ri.recipe_id = ?1
             ORDER BY i.name, ri.ingredient_id",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT t.tag_id, t.name, t.color, t.slug
             FROM recipe_tags rt
             JOIN tags t ON t.tag_id = rt.tag_id
             WHERE rt.recipe_id = ?1
             ORDER BY t.name",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(Some(RecipeWithDetails {
            recipe,
            ingredients,
            tags,
        }))
    }

    /// Newest first, like the original feed.
    pub async fn list(
        pool: &SqlitePool,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>> {
        let mut qb = sqlx::QueryBuilder::<Sqlite>::new(
            "SELECT r.recipe_id, r.author_id, r.name, r.text, r.image,
                    r.cooking_time, r.created_at
             FROM recipes r
             WHERE 1 = 1",
        );

        if let Some(author_id) = filter.author_id {
            qb.push(" AND r.author_id = ");
            qb.push_bind(author_id);
        }
        if !filter.tag_slugs.is_empty() {
            qb.push(
                " AND r.recipe_id IN (
                     SELECT rt.recipe_id
                     FROM recipe_tags rt
                     JOIN tags t ON t.tag_id = rt.tag_id
                     WHERE t.slug IN (",
            );
            let mut separated = qb.separated(", ");
            for slug in &filter.tag_slugs {
                separated.push_bind(slug);
            }
            qb.push("))");
        }
        if let Some(user_id) = filter.favorited_by {
            qb.push(
                " AND r.recipe_id IN (SELECT recipe_id FROM favorites WHERE user_id = ",
            );
            qb.push_bind(user_id);
            qb.push(")");
        }
        if let Some(user_id) = filter.in_cart_of {
            qb.push(
                " AND r.recipe_id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ",
            );
            qb.push_bind(user_id);
            qb.push(")");
        }

        qb.push(" ORDER BY r.recipe_id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let recipes = qb.build_query_as::<Recipe>().fetch_all(pool).await?;

        Ok(recipes)
    }
}

async fn write_associations(
    tx: &mut Transaction<'_, Sqlite>,
    recipe_id: i64,
    input: &RecipeInput,
) -> Result<()> {
    for line in &input.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
             VALUES (?1, ?2, ?3)",
        )
        .bind(recipe_id)
        .bind(line.ingredient_id)
        .bind(line.amount)
        .execute(&mut **tx)
        .await
        .map_err(|err| reference_to_validation(err, "ingredient", line.ingredient_id))?;
    }

    for &tag_id in &input.tag_ids {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await
            .map_err(|err| reference_to_validation(err, "tag", tag_id))?;
    }

    Ok(())
}

/// A dangling reference in a create/update request is the caller's fault,
/// not an internal inconsistency, so it surfaces as `Validation`.
fn reference_to_validation(err: sqlx::Error, kind: &str, id: i64) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return Error::validation(format!("{kind} {id} does not exist"));
        }
        if db_err.is_unique_violation() {
            return Error::validation(format!("{kind} {id} is listed twice"));
        }
    }
    Error::Sqlx(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_pool, seed_ingredient, seed_user};

    fn input(lines: &[(i64, i64)]) -> RecipeInput {
        RecipeInput {
            name: "Soup".to_string(),
            text: "Boil everything.".to_string(),
            image: None,
            cooking_time: 30,
            tag_ids: vec![],
            ingredients: lines
                .iter()
                .map(|&(ingredient_id, amount)| IngredientAmount {
                    ingredient_id,
                    amount,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn create_persists_lines_and_resolves_units() {
        let pool = create_test_pool().await;
        let author = seed_user(&pool, "chef").await;
        let salt = seed_ingredient(&pool, "Salt", "ml").await;
        let water = seed_ingredient(&pool, "Water", "ml").await;

        let recipe = Recipe::create(
            &pool,
            author.user_id,
            &input(&[(salt.ingredient_id, 5), (water.ingredient_id, 200)]),
        )
        .await
        .unwrap();

        let full = Recipe::get_full(&pool, recipe.recipe_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(full.ingredients.len(), 2);
        assert_eq!(full.ingredients[0].name, "Salt");
        assert_eq!(full.ingredients[0].amount, 5);
        assert_eq!(full.ingredients[1].name, "Water");
        assert_eq!(full.ingredients[1].measurement_unit, "ml");
    }

    #[tokio::test]
    async fn duplicate_ingredient_in_input_is_rejected() {
        let pool = create_test_pool().await;
        let author = seed_user(&pool, "chef").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;

        let err = Recipe::create(
            &pool,
            author.user_id,
            &input(&[(salt.ingredient_id, 5), (salt.ingredient_id, 3)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let pool = create_test_pool().await;
        let author = seed_user(&pool, "chef").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;

        let err = Recipe::create(&pool, author.user_id, &input(&[(salt.ingredient_id, 0)]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_ingredient_rolls_back_the_recipe() {
        let pool = create_test_pool().await;
        let author = seed_user(&pool, "chef").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;

        let err = Recipe::create(
            &pool,
            author.user_id,
            &input(&[(salt.ingredient_id, 5), (9000, 1)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // Nothing of the failed create may remain.
        let recipes = Recipe::list(&pool, &RecipeFilter::default(), 10, 0)
            .await
            .unwrap();
        assert!(recipes.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_the_line_set() {
        let pool = create_test_pool().await;
        let author = seed_user(&pool, "chef").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;
        let pepper = seed_ingredient(&pool, "Pepper", "g").await;

        let recipe = Recipe::create(&pool, author.user_id, &input(&[(salt.ingredient_id, 5)]))
            .await
            .unwrap();

        Recipe::update(
            &pool,
            recipe.recipe_id,
            &input(&[(pepper.ingredient_id, 2)]),
        )
        .await
        .unwrap();

        let full = Recipe::get_full(&pool, recipe.recipe_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(full.ingredients.len(), 1);
        assert_eq!(full.ingredients[0].name, "Pepper");
    }

    #[tokio::test]
    async fn list_filters_by_tag_slug() {
        let pool = create_test_pool().await;
        let author = seed_user(&pool, "chef").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;
        let dinner = Tag::create(&pool, "Dinner", "#123456", "dinner")
            .await
            .unwrap();

        let mut tagged = input(&[(salt.ingredient_id, 1)]);
        tagged.tag_ids = vec![dinner.tag_id];
        let recipe = Recipe::create(&pool, author.user_id, &tagged).await.unwrap();
        Recipe::create(&pool, author.user_id, &input(&[(salt.ingredient_id, 2)]))
            .await
            .unwrap();

        let filter = RecipeFilter {
            tag_slugs: vec!["dinner".to_string()],
            ..RecipeFilter::default()
        };
        let found = Recipe::list(&pool, &filter, 10, 0).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].recipe_id, recipe.recipe_id);
    }
}
