use std::time::Duration;

use serde::Deserialize;
use tokio::sync::OnceCell;

use super::{QueryRequest, SearchMatch, VectorIndex};
use crate::auth::providers::ResolvedIndex;
use crate::config::REQUEST_TIMEOUT_SECS;
use crate::error::{Result, ShopError};

const API_VERSION: &str = "2024-07";

/// Control-plane view of an index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub metric: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<SearchMatch>,
}

pub struct PineconeIndex {
    api_key: String,
    index_name: String,
    control_endpoint: String,
    /// Data-plane base URL, looked up once on first use when not configured
    host: OnceCell<String>,
    client: reqwest::Client,
}

impl PineconeIndex {
    pub fn new(resolved: &ResolvedIndex) -> Self {
        Self {
            api_key: resolved.api_key.clone(),
            index_name: resolved.index_name.clone(),
            control_endpoint: resolved.control_endpoint.trim_end_matches('/').to_string(),
            host: OnceCell::new_with(resolved.host.as_deref().map(normalize_host)),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// `GET /indexes/{name}` on the control plane.
    pub async fn describe_index(&self) -> Result<IndexDescription> {
        let response = self.client.execute(self.describe_request()?).await?;

        if !response.status().is_success() {
            return Err(ShopError::from_response("Pinecone control plane", response).await);
        }

        Ok(response.json().await?)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    fn describe_request(&self) -> reqwest::Result<reqwest::Request> {
        self.authorized(
            self.client
                .get(format!("{}/indexes/{}", self.control_endpoint, self.index_name)),
        )
        .build()
    }

    fn query_request(&self, host: &str, request: &QueryRequest) -> reqwest::Result<reqwest::Request> {
        self.authorized(self.client.post(format!("{}/query", host)))
            .json(request)
            .build()
    }

    async fn host(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let description = self.describe_index().await?;
                tracing::debug!(index = %description.name, host = %description.host, "resolved index host");
                Ok::<_, ShopError>(normalize_host(&description.host))
            })
            .await?;
        Ok(host.as_str())
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<SearchMatch>> {
        let host = self.host().await?;
        let response = self
            .client
            .execute(self.query_request(host, request)?)
            .await?;

        if !response.status().is_success() {
            return Err(ShopError::from_response("Pinecone query", response).await);
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.matches)
    }
}

/// Hosts come back from the control plane without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
