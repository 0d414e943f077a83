//! The generation side of a chat turn: retrieve products, ask the model.

mod chain;
pub mod prompt;

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::retrieval::RetrievedDocument;

pub use chain::RetrievalChain;

#[derive(Debug, Clone, Default)]
pub struct AssistantAnswer {
    pub answer: String,
    pub source_documents: Vec<RetrievedDocument>,
}

#[async_trait]
pub trait ProductAssistant: Send + Sync {
    /// Answer `question` given prior `(question, answer)` turns.
    async fn query(
        &self,
        question: &str,
        history: &[(String, String)],
    ) -> Result<AssistantAnswer, ApiError>;

    /// Number of products available to retrieval.
    async fn item_count(&self) -> Result<usize, ApiError>;
}
