use std::fmt;

/// Chat-completion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama,
}

impl Provider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
            Provider::Ollama => "gemma3:4b",
        }
    }

    /// Credential slot in auth.json, if the provider needs one.
    pub fn service(&self) -> Option<Service> {
        match self {
            Provider::OpenAI => Some(Service::OpenAI),
            Provider::Anthropic => Some(Service::Anthropic),
            Provider::Ollama => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic (Claude)",
            Provider::Ollama => "Ollama (local)",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Provider> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Some(Provider::OpenAI),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "ollama" | "local" => Some(Provider::Ollama),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}

/// Embedding backends. The index was built with one of these, so the model
/// must match the index dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingBackend {
    OpenAI,
    Ollama,
}

impl EmbeddingBackend {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            EmbeddingBackend::OpenAI => "https://api.openai.com/v1",
            EmbeddingBackend::Ollama => "http://localhost:11434",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            EmbeddingBackend::OpenAI => "text-embedding-ada-002",
            EmbeddingBackend::Ollama => "nomic-embed-text",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<EmbeddingBackend> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Some(EmbeddingBackend::OpenAI),
            "ollama" | "local" => Some(EmbeddingBackend::Ollama),
            _ => None,
        }
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackend::OpenAI => write!(f, "openai"),
            EmbeddingBackend::Ollama => write!(f, "ollama"),
        }
    }
}

/// Hosted services that hold a secret in auth.json.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    OpenAI,
    Anthropic,
    Pinecone,
}

impl Service {
    pub fn all() -> &'static [Service] {
        &[Service::OpenAI, Service::Anthropic, Service::Pinecone]
    }

    pub fn env_var_name(&self) -> &'static str {
        match self {
            Service::OpenAI => "OPENAI_API_KEY",
            Service::Anthropic => "ANTHROPIC_API_KEY",
            Service::Pinecone => "PINECONE_API_KEY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Service::OpenAI => "OpenAI",
            Service::Anthropic => "Anthropic (Claude)",
            Service::Pinecone => "Pinecone",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Service> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Some(Service::OpenAI),
            "anthropic" | "claude" => Some(Service::Anthropic),
            "pinecone" | "index" => Some(Service::Pinecone),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::OpenAI => write!(f, "openai"),
            Service::Anthropic => write!(f, "anthropic"),
            Service::Pinecone => write!(f, "pinecone"),
        }
    }
}

/// A fully resolved chat provider configuration.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: Provider,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedEmbedding {
    pub backend: EmbeddingBackend,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedIndex {
    pub api_key: String,
    pub index_name: String,
    /// Data-plane host. Looked up through the control plane when absent.
    pub host: Option<String>,
    pub control_endpoint: String,
}
