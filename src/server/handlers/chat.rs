use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::chat::{respond, ChatRequest};
use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = respond(
        state.assistant.as_ref(),
        &state.verifier,
        &state.site,
        &request,
    )
    .await?;
    Ok(Json(response))
}

pub async fn product_count(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let count = state.assistant.item_count().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count indexed products");
        e.context("Error getting product count")
    })?;

    Ok(Json(json!({
        "count": count,
        "status": "ready"
    })))
}
