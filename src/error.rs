use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Embedding provider returned no vector")]
    EmptyEmbedding,

    #[error("LLM returned empty response")]
    LlmEmptyResponse,

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("{failed} of {total} connectivity checks failed")]
    ChecksFailed { failed: usize, total: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Auth error: {0}")]
    Auth(String),
}

impl ShopError {
    /// Build an `Upstream` error from a non-success HTTP response.
    pub async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ShopError::Upstream {
            service,
            status,
            body,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
