//! The single lesson panel and its streamed request.
//!
//! Lifecycle: `idle -> config (quiz only) -> loading -> streaming -> complete`,
//! with `error` reachable from loading/streaming. Any open session can be
//! dropped back to idle by [`LessonController::close`] or replaced by a new
//! [`LessonController::open`].
//!
//! Every request gets a fresh [`Uuid`] and [`CancellationToken`]. Opening or
//! closing cancels the previous token before anything else happens, and
//! events are applied only when their id matches the active request, so a
//! chunk that was already queued when its request was superseded can never
//! reach the new session.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{EventSender, WorkspaceEvent};
use crate::error::BackendError;
use crate::models::{
    ContentKind, HistoryEvent, LessonMode, LessonSession, LessonStage, QuizConfig,
    FAILED_LESSON_PLACEHOLDER,
};
use crate::services::diagram_service::expand_diagrams;
use crate::services::history_service::parse_timeline;
use crate::services::{AnalyzeRequest, Backend, Config, StreamReader};

#[derive(Debug)]
pub enum LessonEvent {
    Chunk { request: Uuid, text: String },
    Finished { request: Uuid },
    Failed { request: Uuid, error: BackendError },
}

impl LessonEvent {
    pub fn request(&self) -> Uuid {
        match self {
            LessonEvent::Chunk { request, .. }
            | LessonEvent::Finished { request }
            | LessonEvent::Failed { request, .. } => *request,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Quiz mode without a configuration; nothing was requested
    AwaitingConfig,
    Requested { request: Uuid },
}

/// What applying a [`LessonEvent`] did to the session
#[derive(Debug)]
pub enum LessonUpdate {
    /// Event belonged to a cancelled or unknown request
    Ignored,
    Appended,
    Completed { mode: LessonMode },
    Failed { error: BackendError },
}

/// Display state of the lesson panel
#[derive(Debug, Clone, PartialEq)]
pub enum LessonView {
    /// Quiz settings form
    Config,
    Loading {
        mode: LessonMode,
        quiz_config: Option<QuizConfig>,
    },
    /// Prose with diagram directives expanded
    Markdown(String),
    Timeline(Vec<HistoryEvent>),
    TimelineUnavailable { raw: String, reason: String },
    /// A complete quiz payload; the workspace owns the parsed session
    Quiz,
    QuizUnavailable { raw: String, reason: String },
}

struct ActiveRequest {
    id: Uuid,
    cancel: CancellationToken,
}

pub struct LessonController {
    backend: Arc<dyn Backend>,
    events: EventSender,
    config: Arc<Config>,
    model: String,
    session: Option<LessonSession>,
    active: Option<ActiveRequest>,
}

impl LessonController {
    pub fn new(backend: Arc<dyn Backend>, events: EventSender, config: Arc<Config>, model: &str) -> Self {
        Self {
            backend,
            events,
            config,
            model: model.to_string(),
            session: None,
            active: None,
        }
    }

    pub fn session(&self) -> Option<&LessonSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Id of the request currently allowed to feed the session
    pub fn active_request(&self) -> Option<Uuid> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    /// Open (or switch) the panel to `mode` for `node`.
    ///
    /// `context` is the selected path of the topic tree at the time of the call.
    pub fn open(
        &mut self,
        node: &str,
        mode: LessonMode,
        quiz_config: Option<QuizConfig>,
        context: &str,
    ) -> OpenOutcome {
        self.cancel_active();

        let quiz_config = match (mode, quiz_config) {
            (LessonMode::Quiz, None) => {
                self.session = Some(LessonSession::awaiting_config(node));
                return OpenOutcome::AwaitingConfig;
            }
            (LessonMode::Quiz, Some(cfg)) => Some(cfg),
            _ => None,
        };

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        self.session = Some(LessonSession::loading(node, mode, quiz_config, id));
        self.active = Some(ActiveRequest {
            id,
            cancel: cancel.clone(),
        });

        let request = AnalyzeRequest {
            node: node.to_string(),
            context: context.to_string(),
            model: self.model.clone(),
            mode,
            difficulty: quiz_config.map(|c| c.difficulty),
            num_questions: quiz_config.map(|c| c.question_count),
        };
        tracing::info!("Opening {} lesson for '{}' ({})", mode, node, id);
        self.spawn_stream(id, cancel, request);

        OpenOutcome::Requested { request: id }
    }

    /// Cancel any in-flight request and close the panel
    pub fn close(&mut self) {
        self.cancel_active();
        if self.session.take().is_some() {
            tracing::debug!("Lesson panel closed");
        }
    }

    /// Escape-key dismissal; returns whether a panel was open
    pub fn dismiss(&mut self) -> bool {
        if self.session.is_none() {
            return false;
        }
        self.close();
        true
    }

    pub fn handle_event(&mut self, event: LessonEvent) -> LessonUpdate {
        let request = event.request();
        let is_current = self.active_request() == Some(request)
            && self.session.as_ref().and_then(|s| s.request_id) == Some(request);
        if !is_current {
            tracing::trace!("Ignoring event for superseded lesson request {}", request);
            return LessonUpdate::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return LessonUpdate::Ignored;
        };

        match event {
            LessonEvent::Chunk { text, .. } => {
                session.content.push_str(&text);
                if !session.mode.holds_loading_until_complete() {
                    session.stage = LessonStage::Streaming;
                }
                LessonUpdate::Appended
            }
            LessonEvent::Finished { .. } => {
                session.stage = LessonStage::Complete;
                self.active = None;
                tracing::info!(
                    "{} lesson for '{}' complete ({} bytes)",
                    session.mode,
                    session.target_node_name,
                    session.content.len()
                );
                LessonUpdate::Completed { mode: session.mode }
            }
            LessonEvent::Failed { error, .. } => {
                tracing::error!("Lesson for '{}' failed: {}", session.target_node_name, error);
                session.stage = LessonStage::Error;
                session.content = FAILED_LESSON_PLACEHOLDER.to_string();
                self.active = None;
                LessonUpdate::Failed { error }
            }
        }
    }

    /// Raw lesson text, for copying to the clipboard
    pub fn copy_text(&self) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|s| s.stage != LessonStage::Config)
            .map(|s| s.content.as_str())
    }

    pub fn reading_time_minutes(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.reading_time_minutes())
    }

    /// Current display state, `None` while the panel is closed
    pub fn view(&self) -> Option<LessonView> {
        let session = self.session.as_ref()?;

        let view = match (session.stage, session.mode.content_kind()) {
            (LessonStage::Config, _) => LessonView::Config,
            (LessonStage::Error, _) => LessonView::Markdown(session.content.clone()),
            (LessonStage::Loading, _) | (LessonStage::Streaming, ContentKind::Quiz) => {
                LessonView::Loading {
                    mode: session.mode,
                    quiz_config: session.quiz_config,
                }
            }
            (_, ContentKind::Prose) => {
                LessonView::Markdown(expand_diagrams(&session.content, &self.config.image_endpoint))
            }
            (_, ContentKind::Timeline) => match parse_timeline(&session.content) {
                Ok(events) => LessonView::Timeline(events),
                Err(e) => LessonView::TimelineUnavailable {
                    raw: session.content.clone(),
                    reason: e.to_string(),
                },
            },
            (_, ContentKind::Quiz) => LessonView::Quiz,
        };
        Some(view)
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("Cancelling lesson request {}", active.id);
            active.cancel.cancel();
        }
    }

    fn spawn_stream(&self, id: Uuid, cancel: CancellationToken, request: AnalyzeRequest) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = stream_lesson(backend.as_ref(), request, id, &events) => Some(result),
            };

            let event = match outcome {
                None => {
                    tracing::debug!("Lesson request {} aborted", id);
                    return;
                }
                Some(Ok(())) => LessonEvent::Finished { request: id },
                Some(Err(error)) => LessonEvent::Failed { request: id, error },
            };
            let _ = events.send(WorkspaceEvent::Lesson(event));
        });
    }
}

impl Drop for LessonController {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

async fn stream_lesson(
    backend: &dyn Backend,
    request: AnalyzeRequest,
    id: Uuid,
    events: &EventSender,
) -> Result<(), BackendError> {
    let mut reader = StreamReader::new(backend.analyze(request).await?);
    while let Some(chunk) = reader.next_chunk().await {
        let text = chunk?;
        if events
            .send(WorkspaceEvent::Lesson(LessonEvent::Chunk { request: id, text }))
            .is_err()
        {
            // nobody is listening any more
            break;
        }
    }
    Ok(())
}
