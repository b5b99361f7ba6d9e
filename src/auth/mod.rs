pub mod providers;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShopError};
use providers::{
    EmbeddingBackend, Provider, ResolvedEmbedding, ResolvedIndex, ResolvedProvider, Service,
};

pub const ENV_LLM_ENDPOINT: &str = "SHOPWHISPER_LLM_ENDPOINT";
pub const ENV_LLM_MODEL: &str = "SHOPWHISPER_LLM_MODEL";
pub const ENV_EMBED_PROVIDER: &str = "SHOPWHISPER_EMBED_PROVIDER";
pub const ENV_EMBED_MODEL: &str = "SHOPWHISPER_EMBED_MODEL";
pub const ENV_EMBED_ENDPOINT: &str = "SHOPWHISPER_EMBED_ENDPOINT";
pub const ENV_PINECONE_INDEX: &str = "PINECONE_INDEX";
pub const ENV_PINECONE_HOST: &str = "PINECONE_INDEX_HOST";

pub const PINECONE_CONTROL_ENDPOINT: &str = "https://api.pinecone.io";

/// Environment lookup, injected so resolution can be tested without
/// touching the process environment.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read a variable from the process environment, ignoring blank values.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// On-disk representation of auth.json
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct AuthStore {
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub embed_provider: Option<String>,
    #[serde(default)]
    pub credentials: HashMap<String, ServiceCredential>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServiceCredential {
    #[serde(rename = "type")]
    pub cred_type: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Pinecone only: index name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Pinecone only: data-plane host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl ServiceCredential {
    pub fn api_key(key: String) -> Self {
        Self {
            cred_type: "api".to_string(),
            key,
            endpoint: None,
            model: None,
            index: None,
            host: None,
        }
    }
}

impl AuthStore {
    /// Path to auth.json
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ShopError::Auth("Could not determine config directory".into()))?;
        Ok(config_dir.join("shopwhisper").join("auth.json"))
    }

    /// Load from the default location, returning default if the file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let store: AuthStore = serde_json::from_str(&data)?;
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save to disk with 0600 permissions
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, &data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn get(&self, service: Service) -> Option<&ServiceCredential> {
        self.credentials.get(&service.to_string())
    }

    pub fn set(&mut self, service: Service, cred: ServiceCredential) {
        self.credentials.insert(service.to_string(), cred);
    }

    pub fn remove(&mut self, service: Service) {
        self.credentials.remove(&service.to_string());
        if self.default_provider.as_deref() == Some(&service.to_string()) {
            self.default_provider = None;
        }
    }

    fn key_for(&self, service: Service, env: EnvLookup) -> Option<String> {
        env(service.env_var_name()).or_else(|| self.get(service).map(|c| c.key.clone()))
    }
}

/// Resolve the chat provider using the precedence chain:
/// explicit CLI arg > env keys > auth.json default > any stored cred > OpenAI
pub fn resolve_provider(
    explicit: Option<&str>,
    store: &AuthStore,
    env: EnvLookup,
) -> Result<ResolvedProvider> {
    let provider = if let Some(name) = explicit {
        Provider::from_str_loose(name)
            .ok_or_else(|| ShopError::Auth(format!("Unknown provider: {}", name)))?
    } else if let Some(provider) = detect_from_env(env) {
        provider
    } else if let Some(provider) = store
        .default_provider
        .as_deref()
        .and_then(Provider::from_str_loose)
    {
        provider
    } else {
        [Provider::OpenAI, Provider::Anthropic]
            .into_iter()
            .find(|p| p.service().and_then(|s| store.get(s)).is_some())
            .unwrap_or(Provider::OpenAI)
    };

    resolve_for_provider(provider, store, env)
}

fn resolve_for_provider(
    provider: Provider,
    store: &AuthStore,
    env: EnvLookup,
) -> Result<ResolvedProvider> {
    let stored = provider.service().and_then(|s| store.get(s));

    let api_key = provider.service().and_then(|s| store.key_for(s, env));

    let endpoint = env(ENV_LLM_ENDPOINT)
        .or_else(|| stored.and_then(|c| c.endpoint.clone()))
        .unwrap_or_else(|| provider.default_endpoint().to_string());

    let model = env(ENV_LLM_MODEL)
        .or_else(|| stored.and_then(|c| c.model.clone()))
        .unwrap_or_else(|| provider.default_model().to_string());

    if let Some(service) = provider.service() {
        if api_key.is_none() {
            return Err(missing_key(service));
        }
    }

    Ok(ResolvedProvider {
        provider,
        endpoint,
        model,
        api_key,
    })
}

fn detect_from_env(env: EnvLookup) -> Option<Provider> {
    [Provider::OpenAI, Provider::Anthropic]
        .into_iter()
        .find(|p| p.service().is_some_and(|s| env(s.env_var_name()).is_some()))
}

/// Resolve the embedding backend. Defaults to OpenAI.
pub fn resolve_embedding(store: &AuthStore, env: EnvLookup) -> Result<ResolvedEmbedding> {
    let backend = match env(ENV_EMBED_PROVIDER).or_else(|| store.embed_provider.clone()) {
        Some(name) => EmbeddingBackend::from_str_loose(&name)
            .ok_or_else(|| ShopError::Config(format!("Unknown embedding provider: {}", name)))?,
        None => EmbeddingBackend::OpenAI,
    };

    let (api_key, stored_endpoint) = match backend {
        EmbeddingBackend::OpenAI => {
            let key = store
                .key_for(Service::OpenAI, env)
                .ok_or_else(|| missing_key(Service::OpenAI))?;
            let endpoint = store.get(Service::OpenAI).and_then(|c| c.endpoint.clone());
            (Some(key), endpoint)
        }
        EmbeddingBackend::Ollama => (None, None),
    };

    let endpoint = env(ENV_EMBED_ENDPOINT)
        .or(stored_endpoint)
        .unwrap_or_else(|| backend.default_endpoint().to_string());
    let model = env(ENV_EMBED_MODEL).unwrap_or_else(|| backend.default_model().to_string());

    Ok(ResolvedEmbedding {
        backend,
        endpoint,
        model,
        api_key,
    })
}

/// Resolve the vector index credentials. Both the key and the index name are
/// required.
pub fn resolve_index(store: &AuthStore, env: EnvLookup) -> Result<ResolvedIndex> {
    let stored = store.get(Service::Pinecone);

    let api_key = store
        .key_for(Service::Pinecone, env)
        .ok_or_else(|| missing_key(Service::Pinecone))?;

    let index_name = env(ENV_PINECONE_INDEX)
        .or_else(|| stored.and_then(|c| c.index.clone()))
        .ok_or_else(|| {
            ShopError::MissingCredential(format!(
                "No Pinecone index name found. Set {} or run: shopwhisper auth login --service pinecone",
                ENV_PINECONE_INDEX
            ))
        })?;

    let host = env(ENV_PINECONE_HOST).or_else(|| stored.and_then(|c| c.host.clone()));
    let control_endpoint = stored
        .and_then(|c| c.endpoint.clone())
        .unwrap_or_else(|| PINECONE_CONTROL_ENDPOINT.to_string());

    Ok(ResolvedIndex {
        api_key,
        index_name,
        host,
        control_endpoint,
    })
}

fn missing_key(service: Service) -> ShopError {
    ShopError::MissingCredential(format!(
        "No API key found for {}. Set {} or run: shopwhisper auth login --service {}",
        service.display_name(),
        service.env_var_name(),
        service
    ))
}
