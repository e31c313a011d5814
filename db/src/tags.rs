use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{map_insert_err, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub tag_id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl Tag {
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        color: &str,
        slug: &str,
    ) -> Result<Self> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, color, slug)
             VALUES (?1, ?2, ?3)
             RETURNING tag_id, name, color, slug",
        )
        .bind(name)
        .bind(color)
        .bind(slug)
        .fetch_one(pool)
        .await
        .map_err(|err| map_insert_err(err, "tag", "tag"))
    }

    pub async fn get_by_id(pool: &SqlitePool, tag_id: i64) -> Result<Option<Self>> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT tag_id, name, color, slug FROM tags WHERE tag_id = ?1",
        )
        .bind(tag_id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT tag_id, name, color, slug FROM tags WHERE slug = ?1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT tag_id, name, color, slug FROM tags ORDER BY name",
        )
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::create_test_pool;

    #[tokio::test]
    async fn slug_is_unique() {
        let pool = create_test_pool().await;

        Tag::create(&pool, "Breakfast", "#ff0000", "breakfast")
            .await
            .unwrap();
        let err = Tag::create(&pool, "Brunch", "#00ff00", "breakfast")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AlreadyExists("tag")));
        assert!(Tag::get_by_slug(&pool, "breakfast").await.unwrap().is_some());
    }
}
