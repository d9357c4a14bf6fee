use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use super::config_service::Config;
use super::stream_reader::ChunkStream;
use crate::error::BackendError;
use crate::models::{Difficulty, LessonMode, ModelInfo, ModelsResponse, Node};

/// `POST /expand` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandRequest {
    pub node: String,
    pub context: String,
    pub model: String,
    pub temperature: f32,
    pub recent_nodes: Vec<String>,
}

/// `POST /analyze` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub node: String,
    pub context: String,
    pub model: String,
    pub mode: LessonMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_questions: Option<u8>,
}

#[derive(Debug, Serialize)]
struct RandomTopicRequest<'a> {
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExpandResponse {
    #[serde(default)]
    children: Option<Vec<Node>>,
}

#[derive(Debug, Deserialize)]
struct RandomTopicResponse {
    #[serde(default)]
    topic: String,
}

/// The generation backend as seen by the client.
///
/// An empty `expand` result is a valid answer meaning "no further
/// decomposition", not an error.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError>;

    async fn expand(&self, request: ExpandRequest) -> Result<Vec<Node>, BackendError>;

    async fn random_topic(&self, model: &str) -> Result<String, BackendError>;

    /// Start a lesson; the body is raw UTF-8 text streamed until EOF.
    async fn analyze(&self, request: AnalyzeRequest) -> Result<ChunkStream, BackendError>;
}

/// Check that `base_url` is an http(s) URL and strip any trailing slash
pub fn validate_base_url(base_url: &str) -> Result<String, BackendError> {
    let base_url = base_url.trim();
    let parsed = url::Url::parse(base_url).map_err(|e| BackendError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BackendError::InvalidUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// HTTP client for the OmniWeb backend
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = validate_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(&config.base_url, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check_status(response: Response) -> Result<Response, BackendError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status { status, body })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        let response = self.client.get(self.endpoint("models")).send().await?;
        let listing: ModelsResponse = Self::decode(Self::check_status(response).await?).await?;
        tracing::debug!("Backend lists {} models", listing.models.len());
        Ok(listing.models)
    }

    async fn expand(&self, request: ExpandRequest) -> Result<Vec<Node>, BackendError> {
        let response = self
            .client
            .post(self.endpoint("expand"))
            .json(&request)
            .send()
            .await?;
        let reply: ExpandResponse = Self::decode(Self::check_status(response).await?).await?;
        Ok(reply.children.unwrap_or_default())
    }

    async fn random_topic(&self, model: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.endpoint("random"))
            .json(&RandomTopicRequest { model })
            .send()
            .await?;
        let reply: RandomTopicResponse = Self::decode(Self::check_status(response).await?).await?;
        let topic = reply.topic.trim().to_string();
        if topic.is_empty() {
            return Err(BackendError::EmptyTopic);
        }
        Ok(topic)
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<ChunkStream, BackendError> {
        let response = self
            .client
            .post(self.endpoint("analyze"))
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(BackendError::from))
            .boxed())
    }
}
