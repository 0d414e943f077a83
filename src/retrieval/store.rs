//! Abstract interface over the product vector index.

use async_trait::async_trait;

use super::document::RetrievedDocument;
use crate::core::errors::ApiError;

/// One nearest-neighbour hit.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub document: RetrievedDocument,
    /// Distance reported by the index (lower = closer).
    pub distance: Option<f32>,
    /// Stored embedding, needed for MMR re-ranking.
    pub embedding: Option<Vec<f32>>,
}

#[async_trait]
pub trait ProductIndex: Send + Sync {
    /// Nearest neighbours of `embedding`, closest first.
    async fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<IndexHit>, ApiError>;

    /// Number of products in the index.
    async fn count(&self) -> Result<usize, ApiError>;
}
