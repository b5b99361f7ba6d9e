pub mod client;
pub mod prompts;

pub use client::LlmClient;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

/// Single-turn chat completion: system + user in, text out.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
