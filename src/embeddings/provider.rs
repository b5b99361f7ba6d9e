use std::time::Duration;

use serde::Deserialize;

use super::Embedder;
use crate::auth::providers::{EmbeddingBackend, ResolvedEmbedding};
use crate::config::REQUEST_TIMEOUT_SECS;
use crate::error::{Result, ShopError};

pub struct EmbeddingProvider {
    backend: EmbeddingBackend,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl EmbeddingProvider {
    pub fn new(resolved: &ResolvedEmbedding) -> Self {
        Self {
            backend: resolved.backend,
            endpoint: resolved.endpoint.trim_end_matches('/').to_string(),
            model: resolved.model.clone(),
            api_key: resolved.api_key.clone(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn embed_openai(&self, text: &str) -> Result<Vec<f32>> {
        let mut req = self
            .client
            .post(format!("{}/embeddings", self.endpoint))
            .json(&openai_body(&self.model, text));
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            return Err(ShopError::from_response("OpenAI embeddings", response).await);
        }

        let result: OpenAiEmbeddingResponse = response.json().await?;
        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(ShopError::EmptyEmbedding)
    }

    async fn embed_ollama(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.endpoint))
            .json(&ollama_body(&self.model, text))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ShopError::from_response("Ollama embeddings", response).await);
        }

        // Non-numeric entries fail to decode rather than shortening the vector
        let result: OllamaEmbeddingResponse = response.json().await?;
        Ok(result.embedding)
    }
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

fn openai_body(model: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "input": text,
    })
}

fn ollama_body(model: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "prompt": text,
    })
}

#[async_trait::async_trait]
impl Embedder for EmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = match self.backend {
            EmbeddingBackend::OpenAI => self.embed_openai(text).await?,
            EmbeddingBackend::Ollama => self.embed_ollama(text).await?,
        };
        if embedding.is_empty() {
            return Err(ShopError::EmptyEmbedding);
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_body_sends_input() {
        let body = openai_body("text-embedding-ada-002", "linen shirt");
        assert_eq!(body["model"], "text-embedding-ada-002");
        assert_eq!(body["input"], "linen shirt");
        assert!(body.get("prompt").is_none());
    }

    #[test]
    fn test_ollama_body_sends_prompt() {
        let body = ollama_body("nomic-embed-text", "linen shirt");
        assert_eq!(body["model"], "nomic-embed-text");
        assert_eq!(body["prompt"], "linen shirt");
        assert!(body.get("input").is_none());
    }

    #[test]
    fn test_ollama_response_keeps_full_dimension() {
        let json = serde_json::json!({ "embedding": [0.25, -1.0, 3] });
        let parsed: OllamaEmbeddingResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.embedding, vec![0.25, -1.0, 3.0]);
    }

    #[test]
    fn test_ollama_response_rejects_non_numeric_entries() {
        let json = serde_json::json!({ "embedding": [0.25, "oops", 0.5] });
        assert!(serde_json::from_value::<OllamaEmbeddingResponse>(json).is_err());

        let json = serde_json::json!({ "embedding": [0.25, null] });
        assert!(serde_json::from_value::<OllamaEmbeddingResponse>(json).is_err());
    }

    #[test]
    fn test_openai_response_takes_first_vector() {
        let json = serde_json::json!({
            "data": [{ "embedding": [0.1, 0.2], "index": 0 }],
            "model": "text-embedding-ada-002"
        });
        let parsed: OpenAiEmbeddingResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
    }
}
