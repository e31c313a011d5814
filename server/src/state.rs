use std::net::SocketAddr;

use color_eyre::eyre::WrapErr;
use db::SqlitePool;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> color_eyre::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()
            .wrap_err("Invalid BIND_ADDR, expected host:port")?;

        Ok(Self { bind_addr })
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub app: AppConfig,
}

impl AppState {
    pub async fn from_env() -> color_eyre::Result<Self> {
        let app = AppConfig::from_env()?;
        let db = db::setup_db_pool().await?;

        Ok(Self { db, app })
    }
}
