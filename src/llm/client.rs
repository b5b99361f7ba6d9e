use std::time::Duration;

use super::{ChatModel, CompletionRequest};
use crate::auth::providers::{Provider, ResolvedProvider};
use crate::config::REQUEST_TIMEOUT_SECS;
use crate::error::{Result, ShopError};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Multi-provider LLM client
pub struct LlmClient {
    provider: Provider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(resolved: &ResolvedProvider) -> Self {
        Self {
            provider: resolved.provider,
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

    /// Anthropic Messages API
    async fn complete_anthropic(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/v1/messages", self.endpoint);

        let mut req = self
            .client
            .post(&url)
            .json(&anthropic_body(request, &self.model));

        if let Some(ref key) = self.api_key {
            req = req
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION);
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            return Err(ShopError::from_response("Anthropic", response).await);
        }

        let json: serde_json::Value = response.json().await?;
        extract_anthropic_text(&json)
    }

    /// OpenAI-compatible API (OpenAI, Ollama, etc.)
    async fn complete_openai_compat(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);

        let mut req = self
            .client
            .post(&url)
            .json(&openai_body(request, &self.model));

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            return Err(ShopError::from_response("Chat completion", response).await);
        }

        let json: serde_json::Value = response.json().await?;
        extract_openai_text(&json)
    }
}

#[async_trait::async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        match self.provider {
            Provider::Anthropic => self.complete_anthropic(request).await,
            Provider::OpenAI | Provider::Ollama => self.complete_openai_compat(request).await,
        }
    }
}

/// Anthropic takes the system prompt as a top-level field.
fn anthropic_body(request: &CompletionRequest, model: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "system": request.system,
        "messages": [
            { "role": "user", "content": request.user },
        ],
    })
}

/// No temperature is sent; the provider default applies.
fn openai_body(request: &CompletionRequest, model: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
        "max_tokens": request.max_tokens,
    })
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or(ShopError::LlmEmptyResponse)
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
        .ok_or(ShopError::LlmEmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shopping_request() -> CompletionRequest {
        CompletionRequest {
            system: "You are a helpful shopping assistant.".into(),
            user: "Customer query: red dress".into(),
            max_tokens: 250,
        }
    }

    #[test]
    fn test_openai_body_carries_system_message_and_token_cap() {
        let body = openai_body(&shopping_request(), "gpt-4o-mini");

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 250);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][0]["content"],
            "You are a helpful shopping assistant."
        );
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Customer query: red dress");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_anthropic_body_uses_top_level_system() {
        let body = anthropic_body(&shopping_request(), "claude-3-5-haiku-latest");

        assert_eq!(body["max_tokens"], 250);
        assert_eq!(body["system"], "You are a helpful shopping assistant.");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }

    #[test]
    fn test_extract_openai_text() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Try the linen dress." } }]
        });
        assert_eq!(extract_openai_text(&json).unwrap(), "Try the linen dress.");
    }

    #[test]
    fn test_extract_openai_null_content_is_empty_response() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        });
        assert!(matches!(
            extract_openai_text(&json),
            Err(ShopError::LlmEmptyResponse)
        ));
    }

    #[test]
    fn test_extract_anthropic_text() {
        let json = serde_json::json!({
            "content": [{ "type": "text", "text": "The sneakers are a great fit." }]
        });
        assert_eq!(
            extract_anthropic_text(&json).unwrap(),
            "The sneakers are a great fit."
        );
    }
}
