use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{map_insert_err, Error, Result};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str =
    "user_id, username, email, first_name, last_name, hashed_password, created_at";

impl User {
    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        hashed_password: &str,
    ) -> Result<Self> {
        let sql = format!(
            "INSERT INTO users (username, email, first_name, last_name, hashed_password)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .bind(first_name)
            .bind(last_name)
            .bind(hashed_password)
            .fetch_one(pool)
            .await
            .map_err(|err| map_insert_err(err, "user", "user"))
    }

    pub async fn get_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<Self>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Ordered by username, matching the catalog ordering of the rest of
    /// the user-facing listings.
    pub async fn list(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username LIMIT ?1 OFFSET ?2"
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(users)
    }
}

/// Minimal session provider: an opaque bearer token per login. The rest of
/// the crate only ever sees the resolved `user_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthToken {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    pub async fn issue(pool: &SqlitePool, user_id: i64) -> Result<Self> {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(40)
            .map(char::from)
            .collect();

        sqlx::query_as::<_, AuthToken>(
            "INSERT INTO auth_tokens (token, user_id)
             VALUES (?1, ?2)
             RETURNING token, user_id, created_at",
        )
        .bind(&token)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|err| map_insert_err(err, "token", "user"))
    }

    pub async fn resolve(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.user_id, u.username, u.email, u.first_name, u.last_name,
                    u.hashed_password, u.created_at
             FROM auth_tokens t
             JOIN users u ON u.user_id = t.user_id
             WHERE t.token = ?1",
        )
            .bind(token)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn revoke(pool: &SqlitePool, token: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token = ?1")
            .bind(token)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("token"));
        }

        Ok(())
    }
}
