//! Scripted in-memory backend for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::backend_client::{AnalyzeRequest, Backend, ExpandRequest};
use super::stream_reader::ChunkStream;
use crate::error::BackendError;
use crate::models::{ModelInfo, Node};

pub(crate) type StreamFeed = mpsc::UnboundedSender<Result<Vec<u8>, BackendError>>;

#[derive(Default)]
pub(crate) struct FakeBackend {
    expand_replies: Mutex<VecDeque<Result<Vec<Node>, BackendError>>>,
    expand_requests: Mutex<Vec<ExpandRequest>>,
    streams: Mutex<VecDeque<Result<mpsc::UnboundedReceiver<Result<Vec<u8>, BackendError>>, BackendError>>>,
    analyze_requests: Mutex<Vec<AnalyzeRequest>>,
    models: Mutex<Option<Vec<ModelInfo>>>,
    topic: Mutex<Option<String>>,
}

pub(crate) fn nodes(names: &[&str]) -> Vec<Node> {
    names.iter().map(|name| Node::new(*name, format!("About {name}"))).collect()
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_children(&self, names: &[&str]) {
        self.expand_replies.lock().unwrap().push_back(Ok(nodes(names)));
    }

    pub fn reply_expand_error(&self) {
        self.expand_replies
            .lock()
            .unwrap()
            .push_back(Err(BackendError::Unavailable("expand down".to_string())));
    }

    pub fn expand_requests(&self) -> Vec<ExpandRequest> {
        self.expand_requests.lock().unwrap().clone()
    }

    /// Queue a stream for the next `analyze` call and return its feed
    pub fn prepare_stream(&self) -> StreamFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams.lock().unwrap().push_back(Ok(rx));
        tx
    }

    pub fn fail_next_analyze(&self) {
        self.streams
            .lock()
            .unwrap()
            .push_back(Err(BackendError::Unavailable("analyze down".to_string())));
    }

    pub fn analyze_requests(&self) -> Vec<AnalyzeRequest> {
        self.analyze_requests.lock().unwrap().clone()
    }

    pub fn set_models(&self, models: Option<Vec<ModelInfo>>) {
        *self.models.lock().unwrap() = models;
    }

    pub fn set_topic(&self, topic: Option<&str>) {
        *self.topic.lock().unwrap() = topic.map(str::to_string);
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        self.models
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::Unavailable("offline".to_string()))
    }

    async fn expand(&self, request: ExpandRequest) -> Result<Vec<Node>, BackendError> {
        self.expand_requests.lock().unwrap().push(request);
        self.expand_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn random_topic(&self, _model: &str) -> Result<String, BackendError> {
        self.topic.lock().unwrap().clone().ok_or(BackendError::EmptyTopic)
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<ChunkStream, BackendError> {
        self.analyze_requests.lock().unwrap().push(request);
        let next = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Unavailable("no stream prepared".to_string())));
        next.map(|rx| UnboundedReceiverStream::new(rx).boxed())
    }
}
