#![allow(dead_code)]

use sqlx::PgPool;
use std::sync::Arc;

use shortlinks::application::services::SearchIndexer;
use shortlinks::domain::entities::{ShortLink, generate_link_id};
use shortlinks::dto::DEFAULT_PAGE_SIZE;
use shortlinks::infrastructure::memory::MemoryStore;
use shortlinks::infrastructure::search::MemorySearchIndex;
use shortlinks::state::MemoryAppState;

/// Services over a fresh in-memory store and search index, with handles to
/// both backends for inspection.
pub struct TestEnv {
    pub state: MemoryAppState,
    pub store: Arc<MemoryStore>,
    pub index: Arc<MemorySearchIndex>,
}

pub fn create_test_env() -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    let index = Arc::new(MemorySearchIndex::new());
    let indexer = Arc::new(SearchIndexer::new(index.clone()));
    let state = MemoryAppState::in_memory(store.clone(), indexer, DEFAULT_PAGE_SIZE);

    TestEnv {
        state,
        store,
        index,
    }
}

pub async fn create_test_link(env: &TestEnv, name: &str, owner: &str, destination: &str) -> ShortLink {
    env.state
        .links
        .create_shortlink(name, owner, owner, destination)
        .await
        .unwrap()
        .unwrap()
}

pub fn names(links: &[ShortLink]) -> Vec<&str> {
    links.iter().map(|l| l.name.as_str()).collect()
}

pub async fn create_pg_link(pool: &PgPool, name: &str, owner: &str, destination: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO short_links (name, destination, link_id, owner, created_by, modified_by) \
         VALUES ($1, $2, $3, $4, $4, $4) RETURNING id",
    )
    .bind(name)
    .bind(destination)
    .bind(generate_link_id())
    .bind(owner)
    .fetch_one(pool)
    .await
    .unwrap()
}
