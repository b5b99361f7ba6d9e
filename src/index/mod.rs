pub mod pinecone;

pub use pinecone::PineconeIndex;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Similarity query against the product index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_values: bool,
    pub include_metadata: bool,
}

impl QueryRequest {
    /// Metadata on, raw vectors off.
    pub fn nearest(vector: Vec<f32>, top_k: usize) -> Self {
        Self {
            vector,
            top_k,
            include_values: false,
            include_metadata: true,
        }
    }
}

/// One neighbour returned by the index, ordered by descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: ProductMetadata,
}

/// Listing fields stored alongside each vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<SearchMatch>>;
}
