//! Application state for catalog-server

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::db::MIGRATOR;
use crate::search::SearchClient;
use crate::services::GoodService;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Search index client
    pub search: SearchClient,
}

impl AppState {
    /// Connect to storage, run migrations and prepare the search index
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        MIGRATOR.run(&pool).await?;

        let search = SearchClient::new(
            &config.search_url,
            config.search_index.clone(),
            Duration::from_secs(config.search_timeout_secs),
        )?;
        search.ensure_index().await?;
        tracing::info!(index = search.index_name(), "Search index ready");

        Ok(Self { pool, search })
    }

    /// State over an existing pool (migrations already applied)
    pub fn from_parts(pool: PgPool, search: SearchClient) -> Self {
        Self { pool, search }
    }

    pub fn goods(&self) -> GoodService {
        GoodService::new(self.pool.clone(), self.search.clone())
    }
}
