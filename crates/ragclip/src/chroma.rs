//! Remote [`VectorStore`] speaking the Chroma v2 REST API.
//!
//! Documents are sent as raw text and queried with `query_texts`. ragclip
//! never computes embeddings, so the server has to embed both the stored
//! `documents` and the incoming `query_texts` itself. A stock Chroma server
//! does not: its Python and JS client libraries embed text before calling
//! the API. Point this backend at a Chroma-compatible server or proxy that
//! applies the collection's embedding function server-side, and confirm
//! that with `vector_store.server_embeds = true`.
//!
//! The collection is resolved (created if missing) on first use and its id
//! cached for the life of the handle.
//!
//! # Retry Strategy
//!
//! - HTTP 429 and 5xx → retry with exponential backoff (1s, 2s, 4s, …)
//! - other 4xx → fail immediately
//! - network errors → retry

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use ragclip_core::models::{ChunkRecord, QueryMatch};
use ragclip_core::store::VectorStore;

use crate::config::VectorStoreConfig;

/// Chunks per upsert request.
const UPSERT_BATCH: usize = 256;

pub struct ChromaStore {
    client: reqwest::Client,
    base_url: String,
    tenant: String,
    database: String,
    collection: String,
    max_retries: u32,
    collection_id: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
}

/// Column-oriented query result: one inner list per query text.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<serde_json::Map<String, Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f64>>>>,
}

impl ChromaStore {
    pub fn new(config: &VectorStoreConfig) -> Result<Self> {
        let url = config
            .url
            .as_ref()
            .ok_or_else(|| anyhow!("vector_store.url required for the chroma backend"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
            collection: config.collection.clone(),
            max_retries: config.max_retries,
            collection_id: OnceCell::new(),
        })
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    async fn collection_url(&self, action: &str) -> Result<String> {
        let id = self
            .collection_id
            .get_or_try_init(|| self.resolve_collection())
            .await?;
        Ok(format!("{}/{}/{}", self.collections_url(), id, action))
    }

    async fn resolve_collection(&self) -> Result<String> {
        let body = json!({ "name": self.collection, "get_or_create": true });
        let value = self
            .send(reqwest::Method::POST, &self.collections_url(), Some(&body))
            .await
            .with_context(|| {
                format!("Failed to open Chroma collection '{}'", self.collection)
            })?;
        let info: CollectionInfo = serde_json::from_value(value)?;
        debug!(collection = %self.collection, id = %info.id, "resolved chroma collection");
        Ok(info.id)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let mut req = self.client.request(method.clone(), url);
            if let Some(body) = body {
                req = req.json(body);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response.text().await?;
                        if text.trim().is_empty() {
                            return Ok(Value::Null);
                        }
                        return Ok(serde_json::from_str(&text)?);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(%status, attempt, "chroma request failed, retrying");
                        last_err = Some(anyhow!("Chroma API error {}: {}", status, body_text));
                        continue;
                    }
                    bail!("Chroma API error {}: {}", status, body_text);
                }
                Err(e) => {
                    warn!(error = %e, attempt, "chroma request failed, retrying");
                    last_err = Some(e.into());
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Chroma request failed after retries")))
    }
}

fn upsert_body(chunks: &[ChunkRecord]) -> Value {
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    let documents: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let metadatas: Vec<Value> = chunks
        .iter()
        .map(|c| json!({ "file_id": c.file_id, "chunk_index": c.chunk_index }))
        .collect();
    json!({ "ids": ids, "documents": documents, "metadatas": metadatas })
}

/// Flatten the first query's columns into ranked matches.
///
/// Distances become scores by negation so that higher is better.
fn parse_query_response(value: Value) -> Result<Vec<QueryMatch>> {
    let resp: QueryResponse =
        serde_json::from_value(value).context("Invalid Chroma query response")?;

    let Some(ids) = resp.ids.into_iter().next() else {
        return Ok(Vec::new());
    };
    let documents = resp.documents.and_then(|d| d.into_iter().next());
    let metadatas = resp.metadatas.and_then(|m| m.into_iter().next());
    let distances = resp.distances.and_then(|d| d.into_iter().next());

    let mut matches = Vec::with_capacity(ids.len());
    for (i, id) in ids.into_iter().enumerate() {
        let Some(text) = documents
            .as_ref()
            .and_then(|d| d.get(i).cloned().flatten())
        else {
            continue;
        };
        let file_id = metadatas
            .as_ref()
            .and_then(|m| m.get(i))
            .and_then(|m| m.as_ref())
            .and_then(|m| m.get("file_id"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                id.split("::chunk_")
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });
        let distance = distances
            .as_ref()
            .and_then(|d| d.get(i).copied().flatten())
            .unwrap_or(0.0);
        matches.push(QueryMatch {
            id,
            file_id,
            text,
            score: -distance,
        });
    }
    Ok(matches)
}

#[async_trait]
impl VectorStore for ChromaStore {
    fn name(&self) -> &str {
        "chroma"
    }

    async fn upsert(&self, chunks: &[ChunkRecord]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let url = self.collection_url("upsert").await?;
        for batch in chunks.chunks(UPSERT_BATCH) {
            self.send(reqwest::Method::POST, &url, Some(&upsert_body(batch)))
                .await?;
        }
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<u64> {
        let filter = json!({ "file_id": file_id });

        let get_url = self.collection_url("get").await?;
        let found = self
            .send(
                reqwest::Method::POST,
                &get_url,
                Some(&json!({ "where": filter, "include": [] })),
            )
            .await?;
        let found: GetResponse = serde_json::from_value(found)?;
        let removed = found.ids.len() as u64;
        if removed == 0 {
            return Ok(0);
        }

        let delete_url = self.collection_url("delete").await?;
        self.send(
            reqwest::Method::POST,
            &delete_url,
            Some(&json!({ "ids": found.ids })),
        )
        .await?;
        Ok(removed)
    }

    async fn query(&self, query: &str, limit: usize) -> Result<Vec<QueryMatch>> {
        let url = self.collection_url("query").await?;
        let body = json!({
            "query_texts": [query],
            "n_results": limit,
            "include": ["documents", "metadatas", "distances"],
        });
        let value = self.send(reqwest::Method::POST, &url, Some(&body)).await?;
        parse_query_response(value)
    }

    async fn count(&self) -> Result<u64> {
        let url = self.collection_url("count").await?;
        let value = self.send(reqwest::Method::GET, &url, None).await?;
        value
            .as_u64()
            .ok_or_else(|| anyhow!("Invalid Chroma count response: {}", value))
    }
}
