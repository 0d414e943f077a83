use std::sync::Arc;

use async_trait::async_trait;

use super::prompt;
use super::{AssistantAnswer, ProductAssistant};
use crate::core::config::{AppConfig, LlmConfig, RetrievalConfig};
use crate::core::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider, OpenAiProvider};
use crate::retrieval::{maximal_marginal_relevance, ChromaIndex, IndexHit, ProductIndex, RetrievedDocument};

/// Conversational retrieval: condense, retrieve with MMR, stuff, answer.
pub struct RetrievalChain {
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn LlmProvider>,
    index: Arc<dyn ProductIndex>,
    llm_config: LlmConfig,
    embedding_model: String,
    retrieval: RetrievalConfig,
}

impl RetrievalChain {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn LlmProvider>,
        index: Arc<dyn ProductIndex>,
        config: &AppConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            index,
            llm_config: config.llm.clone(),
            embedding_model: config.embeddings.model.clone(),
            retrieval: config.retrieval.clone(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let llm = Arc::new(OpenAiProvider::new(&config.llm.base_url, config.llm.api_key.clone()));
        let embedder = Arc::new(OpenAiProvider::new(
            &config.embeddings.base_url,
            config.embeddings.api_key.clone(),
        ));
        let index = Arc::new(ChromaIndex::new(&config.retrieval));
        Self::new(llm, embedder, index, config)
    }

    async fn standalone_question(
        &self,
        question: &str,
        history: &[(String, String)],
    ) -> Result<String, ApiError> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let request = ChatRequest::new(vec![ChatMessage::user(prompt::condense_prompt(
            &prompt::format_history(history),
            question,
        ))])
        .with_config(&self.llm_config);

        let condensed = self.llm.chat(request, &self.llm_config.model).await?;
        let condensed = condensed.trim();
        if condensed.is_empty() {
            return Ok(question.to_string());
        }
        tracing::debug!(condensed = %condensed, "Condensed follow-up question");
        Ok(condensed.to_string())
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedDocument>, ApiError> {
        let mut embeddings = self
            .embedder
            .embed(&[question.to_string()], &self.embedding_model)
            .await?;
        let query = embeddings
            .pop()
            .ok_or_else(|| ApiError::Upstream("Embedding server returned no vector".to_string()))?;

        let fetch_k = self.retrieval.fetch_k.max(self.retrieval.k);
        let hits = self.index.query(&query, fetch_k).await?;
        let documents = select_documents(&query, hits, self.retrieval.k, self.retrieval.lambda_mult);
        tracing::debug!(retrieved = documents.len(), "Retrieved product documents");
        Ok(documents)
    }
}

/// MMR over the hits' stored embeddings; nearest-first truncation when the
/// index did not return embeddings for every hit.
fn select_documents(query: &[f32], hits: Vec<IndexHit>, k: usize, lambda_mult: f32) -> Vec<RetrievedDocument> {
    if hits.iter().any(|hit| hit.embedding.is_none()) {
        tracing::warn!("Index hits lack embeddings; skipping MMR re-ranking");
        return hits.into_iter().take(k).map(|hit| hit.document).collect();
    }

    let candidates: Vec<Vec<f32>> = hits
        .iter()
        .map(|hit| hit.embedding.clone().unwrap_or_default())
        .collect();
    let order = maximal_marginal_relevance(query, &candidates, lambda_mult, k);

    let mut slots: Vec<Option<RetrievedDocument>> = hits.into_iter().map(|hit| Some(hit.document)).collect();
    order
        .into_iter()
        .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
        .collect()
}

#[async_trait]
impl ProductAssistant for RetrievalChain {
    async fn query(
        &self,
        question: &str,
        history: &[(String, String)],
    ) -> Result<AssistantAnswer, ApiError> {
        let standalone = self.standalone_question(question, history).await?;
        let documents = self.retrieve(&standalone).await?;

        let prompt = prompt::answer_prompt(
            &prompt::format_context(&documents),
            &prompt::format_history(history),
            &standalone,
        );
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]).with_config(&self.llm_config);
        let answer = self.llm.chat(request, &self.llm_config.model).await?;

        Ok(AssistantAnswer {
            answer,
            source_documents: documents,
        })
    }

    async fn item_count(&self) -> Result<usize, ApiError> {
        self.index.count().await
    }
}
