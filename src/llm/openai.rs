use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// Client for any server speaking the OpenAI `/v1` chat and embeddings API.
#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(base_url: impl AsRef<str>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client: Client::new(),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature { obj.insert("temperature".to_string(), json!(t)); }
            if let Some(t) = request.max_tokens { obj.insert("max_tokens".to_string(), json!(t)); }
        }

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("LLM chat error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;
        completion_content(&payload)
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Embedding error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;
        let embeddings = embedding_vectors(&payload);
        if embeddings.len() != inputs.len() {
            return Err(ApiError::Upstream(format!(
                "Embedding server returned {} vectors for {} inputs",
                embeddings.len(),
                inputs.len()
            )));
        }

        Ok(embeddings)
    }
}

fn completion_content(payload: &Value) -> Result<String, ApiError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Upstream("LLM response contained no message content".to_string()))
}

fn embedding_vectors(payload: &Value) -> Vec<Vec<f32>> {
    let mut items: Vec<(u64, Vec<f32>)> = Vec::new();
    if let Some(data) = payload["data"].as_array() {
        for (position, item) in data.iter().enumerate() {
            if let Some(vals) = item["embedding"].as_array() {
                let vec: Vec<f32> = vals.iter().filter_map(|v| v.as_f64().map(|f| f as f32)).collect();
                let index = item["index"].as_u64().unwrap_or(position as u64);
                items.push((index, vec));
            }
        }
    }
    items.sort_by_key(|(index, _)| *index);
    items.into_iter().map(|(_, vec)| vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_choice_content() {
        let payload = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Try [Blade](W1)." } }]
        });
        assert_eq!(completion_content(&payload).unwrap(), "Try [Blade](W1).");
    }

    #[test]
    fn missing_content_is_an_upstream_error() {
        let payload = json!({ "choices": [] });
        assert!(matches!(completion_content(&payload), Err(ApiError::Upstream(_))));
    }

    #[test]
    fn embeddings_follow_declared_index() {
        let payload = json!({
            "data": [
                { "index": 1, "embedding": [0.5, 0.5] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        assert_eq!(embedding_vectors(&payload), vec![vec![1.0, 0.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let provider = OpenAiProvider::new("http://localhost:8080/", Some("  ".to_string()));
        assert!(provider.api_key.is_none());
        assert_eq!(provider.base_url, "http://localhost:8080");
    }
}
