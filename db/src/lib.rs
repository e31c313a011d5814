use std::str::FromStr;

use color_eyre::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub(crate) mod entry_set;
pub mod error;
pub mod favorites;
pub mod follows;
pub mod ingredients;
pub mod recipes;
pub mod shopping_cart;
pub mod shopping_list;
pub mod tags;
pub mod test_utils;
pub mod users;

pub use entry_set::SetEntry;
pub use error::Error;
pub use sqlx;
pub use sqlx::SqlitePool;

/// Opens the database named by `DATABASE_URL` and brings it up to date.
///
/// Foreign keys are switched on for every connection; the cascade and
/// uniqueness rules in the schema depend on it.
#[tracing::instrument(err)]
pub async fn setup_db_pool() -> Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:foodgram.db?mode=rwc".to_string());

    let options = SqliteConnectOptions::from_str(&database_url)?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Migrations applied");

    Ok(pool)
}
