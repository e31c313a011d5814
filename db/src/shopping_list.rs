//! The shopping-list aggregation: turns a user's cart into one summed,
//! deduplicated ingredient list.

use sqlx::SqlitePool;

use crate::error::{Error, Result};

const HEADER: &str = "Foodgram shopping list:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub amount: i64,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    pub items: Vec<ShoppingListItem>,
}

#[derive(sqlx::FromRow)]
struct AggregatedRow {
    ingredient_id: i64,
    name: Option<String>,
    measurement_unit: Option<String>,
    amount: i64,
}

impl ShoppingList {
    /// One read transaction: cart membership, line join, `GROUP BY` with a
    /// summed amount, catalog lookup. Ordered by ingredient name with the
    /// id as tie-break, since `(name, unit)` pairs may repeat.
    ///
    /// A line whose ingredient is missing from the catalog fails the whole
    /// computation with [`Error::DataIntegrity`]; it is never dropped.
    pub async fn compute(pool: &SqlitePool, user_id: i64) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let rows = sqlx::query_as::<_, AggregatedRow>(
            "SELECT ri.ingredient_id AS ingredient_id,
                    i.name AS name,
                    i.measurement_unit AS measurement_unit,
                    SUM(ri.amount) AS amount
             FROM shopping_cart sc
             JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
             LEFT JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
             WHERE sc.user_id = ?1
             GROUP BY ri.ingredient_id
             ORDER BY i.name, ri.ingredient_id",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let (Some(name), Some(measurement_unit)) = (row.name, row.measurement_unit) else {
                return Err(Error::DataIntegrity(format!(
                    "recipe line references ingredient {}, which does not exist",
                    row.ingredient_id
                )));
            };
            items.push(ShoppingListItem {
                name,
                amount: row.amount,
                measurement_unit,
            });
        }

        Ok(Self { items })
    }

    /// The downloadable report: a fixed header line, then one line per
    /// ingredient. An empty cart renders the header alone.
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        for item in &self.items {
            out.push_str(&format!(
                "{}, {} {}\n",
                item.name, item.amount, item.measurement_unit
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopping_cart;
    use crate::test_utils::{create_test_pool, seed_ingredient, seed_recipe, seed_user};

    #[tokio::test]
    async fn empty_cart_renders_header_only() {
        let pool = create_test_pool().await;
        let buyer = seed_user(&pool, "buyer").await;

        let list = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();

        assert!(list.items.is_empty());
        assert_eq!(list.render(), "Foodgram shopping list:\n");
    }

    #[tokio::test]
    async fn shared_ingredient_is_merged_across_recipes() {
        let pool = create_test_pool().await;
        let chef = seed_user(&pool, "chef").await;
        let buyer = seed_user(&pool, "buyer").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;

        let a = seed_recipe(&pool, chef.user_id, "A", &[(salt.ingredient_id, 5)]).await;
        let b = seed_recipe(&pool, chef.user_id, "B", &[(salt.ingredient_id, 3)]).await;
        shopping_cart::add(&pool, buyer.user_id, a.recipe_id)
            .await
            .unwrap();
        shopping_cart::add(&pool, buyer.user_id, b.recipe_id)
            .await
            .unwrap();

        let list = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();

        assert_eq!(
            list.items,
            vec![ShoppingListItem {
                name: "Salt".to_string(),
                amount: 8,
                measurement_unit: "g".to_string(),
            }]
        );
        assert_eq!(list.render(), "Foodgram shopping list:\nSalt, 8 g\n");
    }

    #[tokio::test]
    async fn recomputation_without_mutation_is_identical() {
        let pool = create_test_pool().await;
        let chef = seed_user(&pool, "chef").await;
        let buyer = seed_user(&pool, "buyer").await;
        let salt = seed_ingredient(&pool, "Salt", "ml").await;
        let water = seed_ingredient(&pool, "Water", "ml").await;

        let soup = seed_recipe(
            &pool,
            chef.user_id,
            "Soup",
            &[(salt.ingredient_id, 5), (water.ingredient_id, 200)],
        )
        .await;
        shopping_cart::add(&pool, buyer.user_id, soup.recipe_id)
            .await
            .unwrap();

        let first = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();
        let second = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[tokio::test]
    async fn items_are_ordered_by_ingredient_name() {
        let pool = create_test_pool().await;
        let chef = seed_user(&pool, "chef").await;
        let buyer = seed_user(&pool, "buyer").await;
        let water = seed_ingredient(&pool, "Water", "ml").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;
        let flour = seed_ingredient(&pool, "Flour", "g").await;

        let dough = seed_recipe(
            &pool,
            chef.user_id,
            "Dough",
            &[
                (water.ingredient_id, 100),
                (salt.ingredient_id, 2),
                (flour.ingredient_id, 500),
            ],
        )
        .await;
        shopping_cart::add(&pool, buyer.user_id, dough.recipe_id)
            .await
            .unwrap();

        let list = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();
        let names: Vec<_> = list.items.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, vec!["Flour", "Salt", "Water"]);
    }

    #[tokio::test]
    async fn favorites_do_not_feed_the_aggregation() {
        let pool = create_test_pool().await;
        let chef = seed_user(&pool, "chef").await;
        let buyer = seed_user(&pool, "buyer").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;

        let soup = seed_recipe(&pool, chef.user_id, "Soup", &[(salt.ingredient_id, 5)]).await;
        crate::favorites::add(&pool, buyer.user_id, soup.recipe_id)
            .await
            .unwrap();

        let list = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();
        assert!(list.items.is_empty());
    }

    #[tokio::test]
    async fn removing_a_cart_recipe_excludes_its_ingredients() {
        let pool = create_test_pool().await;
        let chef = seed_user(&pool, "chef").await;
        let buyer = seed_user(&pool, "buyer").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;
        let sugar = seed_ingredient(&pool, "Sugar", "g").await;

        let soup = seed_recipe(&pool, chef.user_id, "Soup", &[(salt.ingredient_id, 5)]).await;
        let cake = seed_recipe(&pool, chef.user_id, "Cake", &[(sugar.ingredient_id, 100)]).await;
        shopping_cart::add(&pool, buyer.user_id, soup.recipe_id)
            .await
            .unwrap();
        shopping_cart::add(&pool, buyer.user_id, cake.recipe_id)
            .await
            .unwrap();

        shopping_cart::remove(&pool, buyer.user_id, soup.recipe_id)
            .await
            .unwrap();

        let list = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();
        let names: Vec<_> = list.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Sugar"]);
    }

    #[tokio::test]
    async fn deleted_recipe_disappears_from_the_aggregation() {
        let pool = create_test_pool().await;
        let chef = seed_user(&pool, "chef").await;
        let buyer = seed_user(&pool, "buyer").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;

        let soup = seed_recipe(&pool, chef.user_id, "Soup", &[(salt.ingredient_id, 5)]).await;
        shopping_cart::add(&pool, buyer.user_id, soup.recipe_id)
            .await
            .unwrap();

        crate::recipes::Recipe::delete(&pool, soup.recipe_id)
            .await
            .unwrap();

        let list = ShoppingList::compute(&pool, buyer.user_id).await.unwrap();
        assert!(list.items.is_empty());
        assert_eq!(list.render(), "Foodgram shopping list:\n");
    }

    #[tokio::test]
    async fn dangling_ingredient_reference_is_a_data_integrity_error() {
        let pool = create_test_pool().await;
        let chef = seed_user(&pool, "chef").await;
        let buyer = seed_user(&pool, "buyer").await;
        let salt = seed_ingredient(&pool, "Salt", "g").await;

        let soup = seed_recipe(&pool, chef.user_id, "Soup", &[(salt.ingredient_id, 5)]).await;
        shopping_cart::add(&pool, buyer.user_id, soup.recipe_id)
            .await
            .unwrap();

        // Corrupt the catalog behind the constraint's back.
        let mut conn = pool.acquire().await.unwrap();
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query("DELETE FROM ingredients WHERE ingredient_id = ?1")
            .bind(salt.ingredient_id)
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut *conn)
            .await
            .unwrap();
        drop(conn);

        let err = ShoppingList::compute(&pool, buyer.user_id).await.unwrap_err();
        assert!(matches!(err, Error::DataIntegrity(_)));
    }
}
