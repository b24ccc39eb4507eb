//! Redis-backed inverted index.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::domain::search_document::{IndexName, TokenDocument, sort_by_doc_id};
use crate::domain::search_index::{IndexError, IndexResult, SearchIndex};
use crate::domain::tokenizer::split_pieces;

const FIELD_DESTINATION: &str = "destination";
const FIELD_NAME: &str = "name";
const FIELD_PIECES: &str = "pieces";
const FIELD_ID: &str = "id";

/// Optimistic-lock retries for one document write.
const MAX_WATCH_ATTEMPTS: u32 = 5;

/// Inverted index stored in Redis.
///
/// Layout, per logical index:
/// - `{prefix}{index}:doc:{doc_id}` - hash with the document fields
/// - `{prefix}{index}:tok:{token}` - set of doc ids carrying `token`
///
/// Replacing a document removes its old postings in the same `MULTI` block
/// that writes the new ones, guarded by a `WATCH` on the document hash.
/// Multi-token lookups intersect the token sets with `SINTER`.
pub struct RedisSearchIndex {
    client: ConnectionManager,
    redis_client: Client,
    key_prefix: String,
}

impl RedisSearchIndex {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, key_prefix: &str) -> IndexResult<Self> {
        info!("Connecting search index to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            IndexError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client.clone()).await.map_err(|e| {
            IndexError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| IndexError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Search index connected to Redis");

        Ok(Self {
            client: manager,
            redis_client: client,
            key_prefix: key_prefix.to_string(),
        })
    }

    fn doc_key(&self, index: IndexName, doc_id: &str) -> String {
        format!("{}{}:doc:{}", self.key_prefix, index, doc_id)
    }

    fn token_key(&self, index: IndexName, token: &str) -> String {
        format!("{}{}:tok:{}", self.key_prefix, index, token)
    }

    /// Swaps the postings and fields of `doc_id` for those of `document`,
    /// or drops them when `document` is `None`. Returns the number of
    /// distinct tokens written.
    ///
    /// Runs as `WATCH doc` / `HGET pieces` / `MULTI .. EXEC` on a dedicated
    /// connection, starting over when another writer touched the document
    /// in between.
    async fn replace(
        &self,
        index: IndexName,
        doc_id: &str,
        document: Option<&TokenDocument>,
    ) -> IndexResult<usize> {
        let doc_key = self.doc_key(index, doc_id);
        let mut conn = self
            .redis_client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| IndexError::ConnectionError(e.to_string()))?;

        for attempt in 1..=MAX_WATCH_ATTEMPTS {
            redis::cmd("WATCH")
                .arg(&doc_key)
                .query_async::<()>(&mut conn)
                .await
                .map_err(operation_error)?;

            let old_pieces: Option<String> = conn
                .hget(&doc_key, FIELD_PIECES)
                .await
                .map_err(operation_error)?;

            if old_pieces.is_none() && document.is_none() {
                redis::cmd("UNWATCH")
                    .query_async::<()>(&mut conn)
                    .await
                    .map_err(operation_error)?;
                return Ok(0);
            }

            let old_pieces = old_pieces.unwrap_or_default();
            let new_pieces = document.map(|d| d.pieces.as_str()).unwrap_or_default();
            let (removed, added) = posting_changes(&old_pieces, new_pieces);

            let mut pipe = redis::pipe();
            pipe.atomic();
            for token in removed {
                pipe.srem(self.token_key(index, token), doc_id).ignore();
            }
            match document {
                Some(document) => {
                    pipe.hset_multiple(
                        &doc_key,
                        &[
                            (FIELD_DESTINATION, document.destination.as_str()),
                            (FIELD_NAME, document.name.as_str()),
                            (FIELD_PIECES, document.pieces.as_str()),
                            (FIELD_ID, document.external_id.as_str()),
                        ],
                    )
                    .ignore();
                }
                None => {
                    pipe.del(&doc_key).ignore();
                }
            }
            for token in added {
                pipe.sadd(self.token_key(index, token), doc_id).ignore();
            }

            // EXEC replies nil when the watched key changed.
            let committed: Option<()> = pipe
                .query_async(&mut conn)
                .await
                .map_err(operation_error)?;
            if committed.is_some() {
                return Ok(distinct_tokens(new_pieces).len());
            }

            debug!(%index, doc_id, attempt, "Search document changed concurrently, retrying");
        }

        Err(IndexError::OperationError(format!(
            "document {doc_id} kept changing during {MAX_WATCH_ATTEMPTS} attempts"
        )))
    }
}

fn operation_error(e: redis::RedisError) -> IndexError {
    IndexError::OperationError(e.to_string())
}

fn distinct_tokens(pieces: &str) -> BTreeSet<&str> {
    split_pieces(pieces).collect()
}

/// Tokens to drop from and add to the postings when `old` becomes `new`.
fn posting_changes<'a>(old: &'a str, new: &'a str) -> (Vec<&'a str>, Vec<&'a str>) {
    let old = distinct_tokens(old);
    let new = distinct_tokens(new);
    (
        old.difference(&new).copied().collect(),
        new.difference(&old).copied().collect(),
    )
}

#[async_trait]
impl SearchIndex for RedisSearchIndex {
    async fn put(&self, index: IndexName, document: TokenDocument) -> IndexResult<()> {
        let doc_id = document.doc_id.clone();
        let tokens = self.replace(index, &doc_id, Some(&document)).await?;
        debug!(%index, %doc_id, tokens, "Search PUT");
        Ok(())
    }

    async fn remove(&self, index: IndexName, doc_id: &str) -> IndexResult<()> {
        self.replace(index, doc_id, None).await?;
        debug!(%index, doc_id, "Search REMOVE");
        Ok(())
    }

    async fn search(
        &self,
        index: IndexName,
        tokens: &[String],
        limit: usize,
    ) -> IndexResult<Vec<TokenDocument>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = tokens.iter().map(|t| self.token_key(index, t)).collect();
        let mut conn = self.client.clone();
        let mut ids: Vec<String> = conn.sinter(keys).await.map_err(operation_error)?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        ids.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        ids.truncate(limit);

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(self.doc_key(index, id));
        }
        let rows: Vec<HashMap<String, String>> = pipe
            .query_async(&mut conn)
            .await
            .map_err(operation_error)?;

        let mut found: Vec<TokenDocument> = ids
            .into_iter()
            .zip(rows)
            .filter(|(_, row)| !row.is_empty())
            .map(|(doc_id, mut row)| TokenDocument {
                doc_id,
                destination: row.remove(FIELD_DESTINATION).unwrap_or_default(),
                name: row.remove(FIELD_NAME).unwrap_or_default(),
                pieces: row.remove(FIELD_PIECES).unwrap_or_default(),
                external_id: row.remove(FIELD_ID).unwrap_or_default(),
            })
            .collect();

        sort_by_doc_id(&mut found);
        debug!(%index, ?tokens, hits = found.len(), "Search QUERY");
        Ok(found)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
