//! Search index integration via REST API (Elasticsearch-compatible, no SDK)
//!
//! Goods are indexed with their name as full text plus a completion field
//! for autocomplete. Only good creation writes here.

use std::time::Duration;

use serde_json::{Value, json};
use shared::models::Good;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search index returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected search response: {0}")]
    Malformed(String),
}

/// Upper bound on ids returned for a name query
const MAX_HITS: u32 = 10_000;
const SUGGESTION_SIZE: u32 = 10;
const SUGGEST_NAME: &str = "name-suggest";

/// Client for one search index
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

impl SearchClient {
    pub fn new(
        base_url: &str,
        index: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.into(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/{}", self.base_url, self.index)
        } else {
            format!("{}/{}/{}", self.base_url, self.index, path)
        }
    }

    /// Create the index with its mapping when it does not exist yet
    pub async fn ensure_index(&self) -> Result<(), SearchError> {
        let resp = self.http.get(self.url("")).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }
        if resp.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(status_error(resp).await);
        }

        let mapping = json!({
            "mappings": {
                "properties": {
                    "name": { "type": "text" },
                    "description": { "type": "text" },
                    "category_id": { "type": "long" },
                    "status": { "type": "keyword" },
                    "name_suggest": { "type": "completion" }
                }
            }
        });
        let resp = self.http.put(self.url("")).json(&mapping).send().await?;
        expect_success(resp).await?;
        tracing::info!(index = %self.index, "Search index created");
        Ok(())
    }

    /// Ids of goods whose name matches `q` (fuzzy)
    pub async fn ids_by_query(&self, q: &str) -> Result<Vec<i64>, SearchError> {
        let body = json!({
            "_source": false,
            "size": MAX_HITS,
            "query": {
                "match": {
                    "name": { "query": q, "fuzziness": "AUTO" }
                }
            }
        });
        let resp = self.http.post(self.url("_search")).json(&body).send().await?;
        let resp = expect_success(resp).await?;

        let hits = resp["hits"]["hits"]
            .as_array()
            .ok_or_else(|| SearchError::Malformed(format!("missing hits: {resp}")))?;
        Ok(hits
            .iter()
            .filter_map(|hit| hit["_id"].as_str().and_then(|id| id.parse().ok()))
            .collect())
    }

    /// Index (or overwrite) the document for `good`; visible to search on return
    pub async fn index_good(&self, good: &Good) -> Result<(), SearchError> {
        let doc = json!({
            "id": good.id,
            "name": good.name,
            "description": good.description,
            "category_id": good.category_id,
            "status": good.status,
            "name_suggest": { "input": [good.name] }
        });
        let resp = self
            .http
            .put(self.url(&format!("_doc/{}", good.id)))
            .query(&[("refresh", "wait_for")])
            .json(&doc)
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    /// Remove a good's document; a missing document is not an error
    pub async fn delete_good(&self, id: i64) -> Result<(), SearchError> {
        let resp = self
            .http
            .delete(self.url(&format!("_doc/{id}")))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_success(resp).await?;
        Ok(())
    }

    /// Distinct good names completing `prefix`
    pub async fn autocomplete(&self, prefix: &str) -> Result<Vec<String>, SearchError> {
        let body = json!({
            "_source": false,
            "suggest": {
                "name-suggest": {
                    "prefix": prefix,
                    "completion": {
                        "field": "name_suggest",
                        "skip_duplicates": true,
                        "size": SUGGESTION_SIZE
                    }
                }
            }
        });
        let resp = self.http.post(self.url("_search")).json(&body).send().await?;
        let resp = expect_success(resp).await?;

        let entries = resp["suggest"][SUGGEST_NAME]
            .as_array()
            .ok_or_else(|| SearchError::Malformed(format!("missing suggestions: {resp}")))?;
        Ok(entries
            .iter()
            .filter_map(|entry| entry["options"].as_array())
            .flatten()
            .filter_map(|option| option["text"].as_str().map(String::from))
            .collect())
    }
}

async fn expect_success(resp: reqwest::Response) -> Result<Value, SearchError> {
    if !resp.status().is_success() {
        return Err(status_error(resp).await);
    }
    Ok(resp.json().await?)
}

async fn status_error(resp: reqwest::Response) -> SearchError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    SearchError::Status { status, body }
}
