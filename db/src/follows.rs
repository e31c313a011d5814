use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{map_insert_err, Error, Result};
use crate::users::User;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FollowEntry {
    pub entry_id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

impl FollowEntry {
    pub async fn create(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<Self> {
        // The schema carries the same CHECK, but a self-follow deserves a
        // descriptive reason, not a bare constraint failure.
        if user_id == author_id {
            return Err(Error::validation("you cannot follow yourself"));
        }

        sqlx::query_as::<_, FollowEntry>(
            "INSERT INTO follows (user_id, author_id)
             VALUES (?1, ?2)
             RETURNING entry_id, user_id, author_id, created_at",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(|err| map_insert_err(err, "follow", "user"))
    }

    pub async fn delete(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2")
            .bind(user_id)
            .bind(author_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("follow"));
        }

        Ok(())
    }

    pub async fn is_following(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool> {
        let present = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = ?1 AND author_id = ?2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await?;

        Ok(present)
    }

    /// Followed authors in the order the follows were made.
    pub async fn authors_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<User>> {
        let authors = sqlx::query_as::<_, User>(
            "SELECT u.user_id, u.username, u.email, u.first_name, u.last_name,
                    u.hashed_password, u.created_at
             FROM follows f
             JOIN users u ON u.user_id = f.author_id
             WHERE f.user_id = ?1
             ORDER BY f.entry_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(authors)
    }
}
