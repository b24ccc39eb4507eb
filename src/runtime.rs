//! Process setup: logging, database pool, search index and index worker.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::application::services::SearchIndexer;
use crate::config::Config;
use crate::domain::index_worker::run_index_worker;
use crate::domain::search_index::SearchIndex;
use crate::infrastructure::persistence::{
    PgClickStatsRepository, PgLinkRepository, PgSiteConfigRepository, PgVersionRepository,
};
use crate::infrastructure::search::{NullSearchIndex, RedisSearchIndex};
use crate::state::{AppState, PgAppState};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this twice is
/// harmless; the second subscriber is ignored.
pub fn init_tracing(default_level: &str, log_format: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Connects to PostgreSQL and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

/// Connects the Redis search index, or falls back to [`NullSearchIndex`]
/// when search is not configured or Redis is unreachable.
pub async fn connect_search_index(config: &Config) -> Arc<dyn SearchIndex> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Search disabled (NullSearchIndex)");
        return Arc::new(NullSearchIndex::new());
    };

    match RedisSearchIndex::connect(redis_url, &config.search_key_prefix).await {
        Ok(index) => {
            tracing::info!("Search enabled (Redis)");
            Arc::new(index)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullSearchIndex.", e);
            Arc::new(NullSearchIndex::new())
        }
    }
}

/// Starts the index worker and returns a queued indexer feeding it.
pub fn spawn_index_worker(
    index: Arc<dyn SearchIndex>,
    capacity: usize,
    max_retries: usize,
) -> (Arc<SearchIndexer>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let worker = tokio::spawn(run_index_worker(rx, index.clone(), max_retries));
    tracing::info!(capacity, max_retries, "Index worker started");

    (Arc::new(SearchIndexer::queued(index, tx)), worker)
}

/// Fully wired services over PostgreSQL, plus the background index worker.
pub struct Runtime {
    pub pool: PgPool,
    pub state: PgAppState,
    index_worker: JoinHandle<()>,
}

impl Runtime {
    /// Connects every backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or migrations fail.
    /// An unreachable search index only disables search.
    pub async fn build(config: &Config) -> Result<Self> {
        let pool = connect_database(config).await?;
        let index = connect_search_index(config).await;
        let (indexer, index_worker) =
            spawn_index_worker(index, config.index_queue_capacity, config.index_max_retries);

        let shared = Arc::new(pool.clone());
        let state = AppState::new(
            Arc::new(PgLinkRepository::new(shared.clone())),
            Arc::new(PgVersionRepository::new(shared.clone())),
            Arc::new(PgClickStatsRepository::new(shared.clone())),
            Arc::new(PgSiteConfigRepository::new(shared)),
            indexer,
            config.page_size,
        );

        Ok(Self {
            pool,
            state,
            index_worker,
        })
    }

    /// Drops the services, waits for queued index events to drain and closes
    /// the pool.
    pub async fn shutdown(self) {
        let Self {
            pool,
            state,
            index_worker,
        } = self;

        drop(state);
        if let Err(e) = index_worker.await {
            tracing::error!(error = %e, "Index worker terminated abnormally");
        }
        pool.close().await;
    }
}
