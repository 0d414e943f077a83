//! One chat turn: generate, verify, rewrite, list.

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::assistant::ProductAssistant;
use crate::core::errors::ApiError;
use crate::links::{build_product_list, resolve, rewrite_references, LinkVerifier, ProductEntry, ProductSite};

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Prior `[question, answer]` pairs, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub products: Vec<ProductEntry>,
    pub source_count: usize,
}

/// Runs one chat turn.
///
/// Only a failing assistant fails the turn; verification problems leave the
/// affected products unverified and the turn continues.
pub async fn respond(
    assistant: &dyn ProductAssistant,
    verifier: &LinkVerifier,
    site: &ProductSite,
    request: &ChatRequest,
) -> Result<ChatResponse, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let span = tracing::info_span!("chat", request_id = %Uuid::new_v4());
    async move {
        tracing::info!(
            history_turns = request.conversation_history.len(),
            "Processing chat request"
        );

        let answer = assistant
            .query(&request.message, &request.conversation_history)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Assistant query failed");
                e.context("Error processing chat request")
            })?;

        let resolution = resolve(&answer.answer, &answer.source_documents, verifier, site).await;
        let list = build_product_list(&answer.source_documents, &resolution.verification, site);
        // Only identifiers backing a listed product are linked in the text.
        let response = rewrite_references(
            &answer.answer,
            &resolution.references,
            |id| resolution.verification.is_verified(id) && list.lists(id),
            site,
        );

        tracing::info!(
            products = list.products.len(),
            source_count = list.source_count,
            "Chat request complete"
        );

        Ok(ChatResponse {
            response,
            products: list.products,
            source_count: list.source_count,
        })
    }
    .instrument(span)
    .await
}
