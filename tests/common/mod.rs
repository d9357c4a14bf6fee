//! Scripted backend shared by the integration tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use omniweb_core::models::{ModelInfo, Node};
use omniweb_core::services::{AnalyzeRequest, Backend, ChunkStream, ExpandRequest};
use omniweb_core::state::{EventReceiver, Workspace};
use omniweb_core::BackendError;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub type Feed = mpsc::UnboundedSender<Result<Vec<u8>, BackendError>>;

enum Lesson {
    Canned(Vec<String>),
    Live(mpsc::UnboundedReceiver<Result<Vec<u8>, BackendError>>),
}

/// Expansion answers are keyed by the node being expanded; lessons are
/// served in the order they were scripted.
#[derive(Default)]
pub struct ScriptedBackend {
    children: Mutex<HashMap<String, VecDeque<Vec<Node>>>>,
    lessons: Mutex<VecDeque<Lesson>>,
    expand_log: Mutex<Vec<ExpandRequest>>,
    analyze_log: Mutex<Vec<AnalyzeRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_expand(&self, node: &str, children: &[&str]) {
        let nodes = children.iter().map(|name| Node::new(*name, "")).collect();
        self.children
            .lock()
            .unwrap()
            .entry(node.to_string())
            .or_default()
            .push_back(nodes);
    }

    pub fn lesson(&self, chunks: &[&str]) {
        let chunks = chunks.iter().map(|c| c.to_string()).collect();
        self.lessons.lock().unwrap().push_back(Lesson::Canned(chunks));
    }

    pub fn live_lesson(&self) -> Feed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lessons.lock().unwrap().push_back(Lesson::Live(rx));
        tx
    }

    pub fn expand_requests(&self) -> Vec<ExpandRequest> {
        self.expand_log.lock().unwrap().clone()
    }

    pub fn analyze_requests(&self) -> Vec<AnalyzeRequest> {
        self.analyze_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        Ok(vec![ModelInfo {
            name: "llama3".to_string(),
            fits: true,
            size_gb: 4.7,
        }])
    }

    async fn expand(&self, request: ExpandRequest) -> Result<Vec<Node>, BackendError> {
        let reply = self
            .children
            .lock()
            .unwrap()
            .get_mut(&request.node)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_default();
        self.expand_log.lock().unwrap().push(request);
        Ok(reply)
    }

    async fn random_topic(&self, _model: &str) -> Result<String, BackendError> {
        Ok("Black Holes".to_string())
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<ChunkStream, BackendError> {
        self.analyze_log.lock().unwrap().push(request);
        match self.lessons.lock().unwrap().pop_front() {
            Some(Lesson::Canned(chunks)) => {
                Ok(stream::iter(chunks.into_iter().map(|c| Ok::<_, BackendError>(c.into_bytes()))).boxed())
            }
            Some(Lesson::Live(rx)) => Ok(UnboundedReceiverStream::new(rx).boxed()),
            None => Err(BackendError::Unavailable("no lesson scripted".to_string())),
        }
    }
}

/// Handle the next event, failing the test if none arrives
pub async fn step(workspace: &mut Workspace, rx: &mut EventReceiver) {
    let event = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for workspace event")
        .expect("event channel closed");
    workspace.handle_event(event);
}

/// Handle events until the lesson stops producing them
pub async fn finish_lesson(workspace: &mut Workspace, rx: &mut EventReceiver) {
    while workspace
        .lesson()
        .session()
        .is_some_and(|s| !s.stage.is_terminal())
    {
        step(workspace, rx).await;
    }
}
