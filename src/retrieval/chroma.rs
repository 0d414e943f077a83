//! Chroma REST client for the product collection.
//!
//! The collection is populated by the offline embedding job; this client
//! only reads from it.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

use super::document::RetrievedDocument;
use super::store::{IndexHit, ProductIndex};
use crate::core::config::RetrievalConfig;
use crate::core::errors::ApiError;

pub struct ChromaIndex {
    base_url: String,
    collection: String,
    client: Client,
    collection_id: OnceCell<String>,
}

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
    #[serde(default)]
    embeddings: Option<Vec<Vec<Vec<f32>>>>,
}

impl ChromaIndex {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            base_url: config.chroma_url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            client: Client::new(),
            collection_id: OnceCell::new(),
        }
    }

    async fn collection_id(&self) -> Result<&str, ApiError> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/api/v1/collections/{}",
                    self.base_url,
                    urlencoding::encode(&self.collection)
                );
                let res = self.client.get(&url).send().await.map_err(ApiError::upstream)?;
                if !res.status().is_success() {
                    let status = res.status();
                    let text = res.text().await.unwrap_or_default();
                    return Err(ApiError::Upstream(format!(
                        "Chroma collection '{}' lookup failed ({}): {}",
                        self.collection, status, text
                    )));
                }
                let info: CollectionInfo = res.json().await.map_err(ApiError::upstream)?;
                tracing::info!(collection = %self.collection, id = %info.id, "Resolved Chroma collection");
                Ok(info.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

#[async_trait]
impl ProductIndex for ChromaIndex {
    async fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<IndexHit>, ApiError> {
        let id = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/query", self.base_url, id);
        let body = json!({
            "query_embeddings": [embedding],
            "n_results": n_results,
            "include": ["documents", "metadatas", "distances", "embeddings"],
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Chroma query error: {}", text)));
        }

        let payload: QueryResponse = res.json().await.map_err(ApiError::upstream)?;
        Ok(hits_from_response(payload))
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let id = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/count", self.base_url, id);
        let res = self.client.get(&url).send().await.map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Chroma count error: {}", text)));
        }

        res.json::<usize>().await.map_err(ApiError::upstream)
    }
}

/// Flattens the first result row of a Chroma query response.
fn hits_from_response(payload: QueryResponse) -> Vec<IndexHit> {
    let ids = payload.ids.into_iter().next().unwrap_or_default();
    let mut documents = first_row(payload.documents);
    let mut metadatas = first_row(payload.metadatas);
    let mut distances = first_row(payload.distances);
    let mut embeddings = first_row(payload.embeddings);

    let empty = Map::new();
    ids.into_iter()
        .enumerate()
        .map(|(idx, _id)| {
            let content = documents.get_mut(idx).and_then(Option::take).unwrap_or_default();
            let metadata = metadatas.get_mut(idx).and_then(Option::take);
            IndexHit {
                document: RetrievedDocument::from_metadata(content, metadata.as_ref().unwrap_or(&empty)),
                distance: distances.get_mut(idx).and_then(Option::take),
                embedding: embeddings.get_mut(idx).map(std::mem::take),
            }
        })
        .collect()
}

fn first_row<T>(rows: Option<Vec<Vec<T>>>) -> Vec<T> {
    rows.and_then(|rows| rows.into_iter().next()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_query_response() {
        let payload: QueryResponse = serde_json::from_value(json!({
            "ids": [["W1", "W2"]],
            "documents": [["Item Number: W1", null]],
            "metadatas": [[
                { "item_number": "W1", "description": "Blade", "category": "Saw Blades", "ean": "570" },
                null
            ]],
            "distances": [[0.12, 0.34]],
            "embeddings": [[[0.1, 0.2], [0.3, 0.4]]]
        }))
        .unwrap();

        let hits = hits_from_response(payload);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.identifier, "W1");
        assert_eq!(hits[0].document.content, "Item Number: W1");
        assert_eq!(hits[0].document.secondary_identifier.as_deref(), Some("570"));
        assert_eq!(hits[0].distance, Some(0.12));
        assert_eq!(hits[1].document.identifier, "");
        assert_eq!(hits[1].embedding.as_deref(), Some(&[0.3, 0.4][..]));
    }

    #[test]
    fn tolerates_missing_include_sections() {
        let payload: QueryResponse = serde_json::from_value(json!({
            "ids": [["W1"]],
            "documents": null,
            "embeddings": null
        }))
        .unwrap();

        let hits = hits_from_response(payload);

        assert_eq!(hits.len(), 1);
        assert!(hits[0].embedding.is_none());
        assert!(hits[0].distance.is_none());
    }

    #[test]
    fn empty_response_has_no_hits() {
        assert!(hits_from_response(QueryResponse::default()).is_empty());
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let index = ChromaIndex::new(&RetrievalConfig {
            chroma_url: "http://chroma:8000/".to_string(),
            ..Default::default()
        });
        assert_eq!(index.base_url, "http://chroma:8000");
    }
}
