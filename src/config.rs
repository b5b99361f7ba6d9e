use crate::auth::providers::{ResolvedEmbedding, ResolvedIndex, ResolvedProvider};
use crate::auth::{self, AuthStore, EnvLookup};
use crate::error::Result;

/// Nearest neighbours requested from the vector index per query
pub const TOP_K: usize = 10;
/// Output token cap for the recommendation reply
pub const MAX_COMPLETION_TOKENS: u32 = 250;
/// Products shown per turn before "show more"
pub const COLLAPSED_PRODUCT_COUNT: usize = 3;
/// HTTP timeout for every upstream call (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Chat-completion provider
    pub llm: ResolvedProvider,
    /// Embedding provider
    pub embedding: ResolvedEmbedding,
    /// Vector index
    pub index: ResolvedIndex,
}

impl Config {
    /// Resolve every credential from the environment and auth.json.
    /// Fails with `MissingCredential` before any network call is made.
    pub fn load(provider_override: Option<&str>) -> Result<Self> {
        let store = AuthStore::load()?;
        Self::resolve(provider_override, &store, &auth::process_env)
    }

    pub fn resolve(
        provider_override: Option<&str>,
        store: &AuthStore,
        env: EnvLookup,
    ) -> Result<Self> {
        let embedding = auth::resolve_embedding(store, env)?;
        let index = auth::resolve_index(store, env)?;
        let llm = auth::resolve_provider(provider_override, store, env)?;

        Ok(Config {
            llm,
            embedding,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::providers::{EmbeddingBackend, Provider};
    use crate::error::ShopError;

    #[test]
    fn test_resolve_full_config_from_env() {
        let env = |name: &str| match name {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "PINECONE_API_KEY" => Some("pc-test".to_string()),
            "PINECONE_INDEX" => Some("products".to_string()),
            _ => None,
        };
        let config = Config::resolve(None, &AuthStore::default(), &env).unwrap();
        assert_eq!(config.llm.provider, Provider::OpenAI);
        assert_eq!(config.embedding.backend, EmbeddingBackend::OpenAI);
        assert_eq!(config.index.index_name, "products");
        assert!(config.index.host.is_none());
    }

    #[test]
    fn test_resolve_without_index_is_missing_credential() {
        let env = |name: &str| match name {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        };
        let err = Config::resolve(None, &AuthStore::default(), &env).unwrap_err();
        assert!(matches!(err, ShopError::MissingCredential(_)));
    }
}
