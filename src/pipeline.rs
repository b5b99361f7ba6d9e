//! Query → recommendation pipeline.
//!
//! embed → vector search → compose reply → project results. Each step needs
//! the previous step's output, so the calls run strictly in sequence and the
//! first failure ends the run.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{Config, MAX_COMPLETION_TOKENS, TOP_K};
use crate::embeddings::{Embedder, EmbeddingProvider};
use crate::error::{Result, ShopError};
use crate::index::{PineconeIndex, QueryRequest, SearchMatch, VectorIndex};
use crate::llm::prompts::{
    recommendation_prompt, EMPTY_COMPLETION_MESSAGE, NO_RESULTS_MESSAGE,
    SYSTEM_SHOPPING_ASSISTANT,
};
use crate::llm::{ChatModel, CompletionRequest, LlmClient};

/// A listing as shown on a product card.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&SearchMatch> for Product {
    fn from(m: &SearchMatch) -> Self {
        Product {
            id: m.id.clone(),
            name: m.metadata.name.clone(),
            price: m.metadata.price.clone(),
            image: m.metadata.image.clone(),
            link: m.metadata.link.clone(),
            description: m.metadata.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recommendation {
    pub message: String,
    pub products: Vec<Product>,
}

pub struct Recommender {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
}

impl Recommender {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            index,
            chat,
        }
    }

    /// Wire the hosted providers named by `config`. No network traffic
    /// happens until the first `search`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(EmbeddingProvider::new(&config.embedding)),
            Arc::new(PineconeIndex::new(&config.index)),
            Arc::new(LlmClient::new(&config.llm)),
        )
    }

    pub async fn search(&self, query: &str) -> Result<Recommendation> {
        if query.trim().is_empty() {
            return Err(ShopError::EmptyQuery);
        }

        let embedding = self.embedder.embed(query).await?;
        debug!(dimension = embedding.len(), "embedded query");

        let matches = self
            .index
            .query(&QueryRequest::nearest(embedding, TOP_K))
            .await?;
        debug!(matches = matches.len(), "vector search finished");

        let message = self.compose_message(query, &matches).await?;
        let products = project_results(&matches);

        Ok(Recommendation { message, products })
    }

    async fn compose_message(&self, query: &str, matches: &[SearchMatch]) -> Result<String> {
        if matches.is_empty() {
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }

        let request = CompletionRequest {
            system: SYSTEM_SHOPPING_ASSISTANT.to_string(),
            user: recommendation_prompt(query, matches),
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        match self.chat.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) | Err(ShopError::LlmEmptyResponse) => {
                warn!("chat completion returned no text, using fallback reply");
                Ok(EMPTY_COMPLETION_MESSAGE.to_string())
            }
            Err(e) => Err(e),
        }
    }
}

/// One product per match, same order.
pub fn project_results(matches: &[SearchMatch]) -> Vec<Product> {
    matches.iter().map(Product::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ProductMetadata;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeEmbedder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(ShopError::Upstream {
                    service: "embeddings",
                    status: 401,
                    body: "invalid api key".into(),
                });
            }
            Ok(vec![0.25, 0.5, 0.75])
        }
    }

    #[derive(Default)]
    struct FakeIndex {
        matches: Vec<SearchMatch>,
        requests: Mutex<Vec<QueryRequest>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl VectorIndex for FakeIndex {
        async fn query(&self, request: &QueryRequest) -> Result<Vec<SearchMatch>> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ShopError::Upstream {
                    service: "index",
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            Ok(self.matches.clone())
        }
    }

    enum Reply {
        Text(&'static str),
        Empty,
        Fail,
    }

    struct FakeChat {
        reply: Reply,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeChat {
        fn replying(reply: Reply) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ChatModel for FakeChat {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            match self.reply {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Empty => Err(ShopError::LlmEmptyResponse),
                Reply::Fail => Err(ShopError::Upstream {
                    service: "chat",
                    status: 429,
                    body: "quota exceeded".into(),
                }),
            }
        }
    }

    fn product_match(id: &str, name: &str, score: f32) -> SearchMatch {
        SearchMatch {
            id: id.into(),
            score,
            metadata: ProductMetadata {
                name: name.into(),
                price: "$89.00".into(),
                image: format!("https://cdn.example.com/{}.jpg", id),
                link: format!("https://shop.example.com/p/{}", id),
                description: Some(format!("{} description", name)),
            },
        }
    }

    struct Harness {
        embedder: Arc<FakeEmbedder>,
        index: Arc<FakeIndex>,
        chat: Arc<FakeChat>,
    }

    impl Harness {
        fn new(embedder: FakeEmbedder, index: FakeIndex, chat: FakeChat) -> Self {
            Self {
                embedder: Arc::new(embedder),
                index: Arc::new(index),
                chat: Arc::new(chat),
            }
        }

        fn recommender(&self) -> Recommender {
            Recommender::new(self.embedder.clone(), self.index.clone(), self.chat.clone())
        }
    }

    #[tokio::test]
    async fn test_red_dress_scenario() {
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex {
                matches: vec![
                    product_match("dress-17", "Scarlet Midi Dress", 0.91),
                    product_match("dress-42", "Poppy Slip Dress", 0.84),
                ],
                ..Default::default()
            },
            FakeChat::replying(Reply::Text("The Scarlet Midi Dress is a lovely pick.")),
        );

        let result = h.recommender().search("red dress under $100").await.unwrap();

        assert_eq!(*h.embedder.calls.lock().unwrap(), vec!["red dress under $100"]);

        let requests = h.index.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].vector, vec![0.25, 0.5, 0.75]);
        assert_eq!(requests[0].top_k, 10);
        assert!(!requests[0].include_values);
        assert!(requests[0].include_metadata);

        let chats = h.chat.requests.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].max_tokens, 250);
        assert_eq!(chats[0].system, SYSTEM_SHOPPING_ASSISTANT);
        assert!(chats[0].user.contains("red dress under $100"));
        assert!(chats[0].user.contains("Product 1: Scarlet Midi Dress"));
        assert!(chats[0].user.contains("Product 2: Poppy Slip Dress"));

        assert_eq!(result.message, "The Scarlet Midi Dress is a lovely pick.");
        let ids: Vec<&str> = result.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["dress-17", "dress-42"]);
    }

    #[tokio::test]
    async fn test_zero_matches_skips_chat() {
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex::default(),
            FakeChat::replying(Reply::Text("should not be used")),
        );

        let result = h.recommender().search("purple unicorn boots").await.unwrap();

        assert_eq!(result.message, NO_RESULTS_MESSAGE);
        assert!(result.products.is_empty());
        assert!(h.chat.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_products_project_matches_one_to_one() {
        let matches: Vec<SearchMatch> = (0..10)
            .map(|i| product_match(&format!("sku-{}", i), &format!("Item {}", i), 1.0 - i as f32 * 0.05))
            .collect();
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex {
                matches: matches.clone(),
                ..Default::default()
            },
            FakeChat::replying(Reply::Text("Here you go.")),
        );

        let result = h.recommender().search("anything").await.unwrap();

        assert_eq!(result.products.len(), matches.len());
        for (product, m) in result.products.iter().zip(&matches) {
            assert_eq!(product.id, m.id);
            assert_eq!(product.name, m.metadata.name);
            assert_eq!(product.link, m.metadata.link);
            assert_eq!(product.description, m.metadata.description);
        }
    }

    #[tokio::test]
    async fn test_embed_failure_stops_pipeline() {
        let h = Harness::new(
            FakeEmbedder {
                fail: true,
                ..Default::default()
            },
            FakeIndex::default(),
            FakeChat::replying(Reply::Text("unused")),
        );

        let err = h.recommender().search("socks").await.unwrap_err();

        assert!(matches!(err, ShopError::Upstream { status: 401, .. }));
        assert!(h.index.requests.lock().unwrap().is_empty());
        assert!(h.chat.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_propagates_unchanged() {
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex {
                fail: true,
                ..Default::default()
            },
            FakeChat::replying(Reply::Text("unused")),
        );

        let err = h.recommender().search("socks").await.unwrap_err();

        assert!(matches!(err, ShopError::Upstream { status: 503, .. }));
        assert!(h.chat.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_returns_no_partial_result() {
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex {
                matches: vec![product_match("a", "A", 0.9)],
                ..Default::default()
            },
            FakeChat::replying(Reply::Fail),
        );

        let err = h.recommender().search("socks").await.unwrap_err();
        assert!(matches!(err, ShopError::Upstream { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_empty_completion_maps_to_fallback() {
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex {
                matches: vec![product_match("a", "A", 0.9)],
                ..Default::default()
            },
            FakeChat::replying(Reply::Empty),
        );

        let result = h.recommender().search("socks").await.unwrap();
        assert_eq!(result.message, EMPTY_COMPLETION_MESSAGE);
        assert_eq!(result.products.len(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_completion_maps_to_fallback() {
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex {
                matches: vec![product_match("a", "A", 0.9)],
                ..Default::default()
            },
            FakeChat::replying(Reply::Text("  \n ")),
        );

        let result = h.recommender().search("socks").await.unwrap();
        assert_eq!(result.message, EMPTY_COMPLETION_MESSAGE);
    }

    #[tokio::test]
    async fn test_blank_query_rejected_before_any_call() {
        let h = Harness::new(
            FakeEmbedder::default(),
            FakeIndex::default(),
            FakeChat::replying(Reply::Text("unused")),
        );

        let err = h.recommender().search("   ").await.unwrap_err();

        assert!(matches!(err, ShopError::EmptyQuery));
        assert!(h.embedder.calls.lock().unwrap().is_empty());
    }
}
