pub mod provider;

pub use provider::EmbeddingProvider;

use crate::error::Result;

/// Turns query text into a vector comparable with the product index.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
