//! The explorer screen: topic tree, lesson panel, quiz and toasts.
//!
//! `Workspace` owns one instance of each state machine plus the event
//! channel their background tasks report on. The host keeps the receiver
//! returned by [`Workspace::start`] and hands every event back through
//! [`Workspace::handle_event`].

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{
    EventReceiver, EventSender, ExpansionOutcome, LessonController, LessonEvent, LessonUpdate,
    LessonView, OpenOutcome, QuizClock, QuizProgress, QuizSession, SelectOutcome, TickOutcome,
    TopicNavigator, WorkspaceEvent,
};
use crate::error::{NavigationError, QuizError, Result};
use crate::models::{
    AnswerRecord, Breadcrumb, LessonMode, LessonStage, Notification, NotificationLevel,
    NotificationLog, QuizConfig, TimelineStop,
};
use crate::services::{Backend, Config};

pub const MSG_EXPAND_EMPTY: &str = "Could not expand this topic. Try again.";
pub const MSG_EXPAND_FAILED: &str = "Failed to expand node";
pub const MSG_REGENERATED: &str = "Regenerated level!";
pub const MSG_REGENERATE_EMPTY: &str = "No new unique topics found.";
pub const MSG_REGENERATE_FAILED: &str = "Regeneration failed";
pub const MSG_LESSON_FAILED: &str = "Failed to load lesson";
pub const MSG_COPIED: &str = "Lesson text copied to clipboard";

pub struct Workspace {
    config: Arc<Config>,
    backend: Arc<dyn Backend>,
    events: EventSender,
    model: String,
    navigator: Option<TopicNavigator>,
    lesson: LessonController,
    quiz: Option<QuizSession>,
    quiz_failure: Option<String>,
    clock: QuizClock,
    notifications: NotificationLog,
}

impl Workspace {
    /// Seed a tree for `topic` and return the workspace with its event receiver
    pub fn start(
        config: Arc<Config>,
        backend: Arc<dyn Backend>,
        model: &str,
        topic: &str,
    ) -> Result<(Self, EventReceiver)> {
        let (events, receiver) = mpsc::unbounded_channel();
        let navigator = TopicNavigator::new(
            topic,
            Arc::clone(&backend),
            events.clone(),
            Arc::clone(&config),
            model,
        )?;
        let lesson = LessonController::new(Arc::clone(&backend), events.clone(), Arc::clone(&config), model);
        let clock = QuizClock::new(config.quiz_tick_period());

        tracing::info!("Started exploring '{}' with {}", navigator.root_topic(), model);
        let workspace = Self {
            config,
            backend,
            events,
            model: model.to_string(),
            navigator: Some(navigator),
            lesson,
            quiz: None,
            quiz_failure: None,
            clock,
            notifications: NotificationLog::new(),
        };
        Ok((workspace, receiver))
    }

    /// Replace the current tree with a fresh one rooted at `topic`
    pub fn restart(&mut self, topic: &str) -> Result<()> {
        let navigator = TopicNavigator::new(
            topic,
            Arc::clone(&self.backend),
            self.events.clone(),
            Arc::clone(&self.config),
            &self.model,
        )?;
        self.exit();
        self.navigator = Some(navigator);
        Ok(())
    }

    /// Leave the explorer: close the lesson, stop the quiz and drop the tree
    pub fn exit(&mut self) {
        self.close_lesson();
        if self.navigator.take().is_some() {
            tracing::info!("Exited topic tree");
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
        self.lesson.set_model(model);
        if let Some(navigator) = self.navigator.as_mut() {
            navigator.set_model(model);
        }
    }

    pub fn navigator(&self) -> Option<&TopicNavigator> {
        self.navigator.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.navigator.is_some()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.navigator.as_ref().map(|n| n.breadcrumbs()).unwrap_or_default()
    }

    pub fn timeline(&self) -> Vec<TimelineStop> {
        self.navigator.as_ref().map(|n| n.timeline()).unwrap_or_default()
    }

    pub fn select_node(&mut self, column: usize, name: &str) -> Result<SelectOutcome> {
        Ok(self.navigator_mut()?.select_node(column, name)?)
    }

    pub fn regenerate_level(&mut self, column: usize) -> Result<u64> {
        Ok(self.navigator_mut()?.regenerate_level(column)?)
    }

    pub fn truncate_to(&mut self, column: usize) -> Result<()> {
        Ok(self.navigator_mut()?.truncate_to(column)?)
    }

    pub fn jump_to_breadcrumb(&mut self, index: usize) -> Result<()> {
        Ok(self.navigator_mut()?.jump_to_breadcrumb(index)?)
    }

    /// Open the lesson panel for `node`, superseding whatever was open
    pub fn open_lesson(&mut self, node: &str, mode: LessonMode) -> Result<OpenOutcome> {
        let context = self.started_navigator()?.context_path();
        self.reset_quiz();
        Ok(self.lesson.open(node, mode, None, &context))
    }

    /// Switch the open panel to another tab for the same node
    pub fn switch_mode(&mut self, mode: LessonMode) -> Result<Option<OpenOutcome>> {
        let Some(node) = self.lesson.session().map(|s| s.target_node_name.clone()) else {
            return Ok(None);
        };
        self.open_lesson(&node, mode).map(Some)
    }

    /// Request the quiz once its settings have been chosen
    pub fn submit_quiz_config(&mut self, quiz_config: QuizConfig) -> Result<Option<OpenOutcome>> {
        let node = match self.lesson.session() {
            Some(s) if s.stage == LessonStage::Config => s.target_node_name.clone(),
            _ => return Ok(None),
        };
        self.request_quiz(&node, quiz_config).map(Some)
    }

    /// Fetch a fresh quiz for the same node and settings
    pub fn new_quiz(&mut self) -> Result<Option<OpenOutcome>> {
        let (node, quiz_config) = match self.lesson.session() {
            Some(s) if s.mode == LessonMode::Quiz => match s.quiz_config {
                Some(cfg) => (s.target_node_name.clone(), cfg),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        self.request_quiz(&node, quiz_config).map(Some)
    }

    pub fn close_lesson(&mut self) {
        self.reset_quiz();
        self.lesson.close();
    }

    /// Escape key; returns whether anything was closed
    pub fn dismiss(&mut self) -> bool {
        self.reset_quiz();
        self.lesson.dismiss()
    }

    pub fn lesson(&self) -> &LessonController {
        &self.lesson
    }

    pub fn lesson_view(&self) -> Option<LessonView> {
        match self.lesson.view()? {
            LessonView::Quiz => match &self.quiz_failure {
                Some(reason) => Some(LessonView::QuizUnavailable {
                    raw: self.lesson.session().map(|s| s.content.clone()).unwrap_or_default(),
                    reason: reason.clone(),
                }),
                None => Some(LessonView::Quiz),
            },
            view => Some(view),
        }
    }

    /// Raw lesson text for the clipboard
    pub fn copy_lesson_text(&mut self) -> Option<String> {
        let text = self.lesson.copy_text()?.to_string();
        self.notifications.push(NotificationLevel::Success, MSG_COPIED);
        Some(text)
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    pub fn answer_quiz(&mut self, option: usize) -> Result<AnswerRecord> {
        let record = self.quiz_mut()?.answer(option)?;
        self.clock.stop();
        Ok(record)
    }

    pub fn advance_quiz(&mut self) -> Result<QuizProgress> {
        let progress = self.quiz_mut()?.advance()?;
        match progress {
            QuizProgress::Next(_) => {
                self.clock.start(&self.events);
            }
            QuizProgress::Finished => self.clock.stop(),
        }
        Ok(progress)
    }

    /// Replay the same questions from the start
    pub fn restart_quiz(&mut self) -> Result<()> {
        self.quiz_mut()?.restart();
        self.clock.start(&self.events);
        Ok(())
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.entries()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn dismiss_notification(&mut self, id: u64) {
        self.notifications.dismiss(id);
    }

    /// Apply the result of background work
    pub fn handle_event(&mut self, event: WorkspaceEvent) {
        match event {
            WorkspaceEvent::Expansion(reply) => {
                let Some(navigator) = self.navigator.as_mut() else {
                    tracing::debug!("Expansion reply {} arrived after exit", reply.ticket);
                    return;
                };
                let outcome = navigator.apply_expansion(reply);
                self.notify_expansion(outcome);
            }
            WorkspaceEvent::Lesson(event) => self.handle_lesson_event(event),
            WorkspaceEvent::QuizTick { generation } => self.handle_quiz_tick(generation),
        }
    }

    fn handle_lesson_event(&mut self, event: LessonEvent) {
        match self.lesson.handle_event(event) {
            LessonUpdate::Ignored | LessonUpdate::Appended => {}
            LessonUpdate::Completed { mode: LessonMode::Quiz } => self.build_quiz(),
            LessonUpdate::Completed { .. } => {}
            LessonUpdate::Failed { .. } => {
                self.notifications.push(NotificationLevel::Error, MSG_LESSON_FAILED);
            }
        }
    }

    fn build_quiz(&mut self) {
        let Some(session) = self.lesson.session() else {
            return;
        };
        match QuizSession::from_content(&session.content, self.config.quiz_budget()) {
            Ok(quiz) => {
                tracing::info!("Quiz ready with {} questions", quiz.question_count());
                self.quiz = Some(quiz);
                self.clock.start(&self.events);
            }
            Err(e) => {
                tracing::warn!("Quiz payload unusable: {}", e);
                self.quiz_failure = Some(e.to_string());
            }
        }
    }

    fn handle_quiz_tick(&mut self, generation: u64) {
        if !self.clock.is_current(generation) {
            return;
        }
        let Some(quiz) = self.quiz.as_mut() else {
            self.clock.stop();
            return;
        };
        match quiz.tick() {
            TickOutcome::Counting(_) => {}
            TickOutcome::TimedOut(_) | TickOutcome::Idle => self.clock.stop(),
        }
    }

    fn notify_expansion(&mut self, outcome: ExpansionOutcome) {
        let (level, message) = match outcome {
            ExpansionOutcome::Expanded { .. } | ExpansionOutcome::Stale => return,
            ExpansionOutcome::NoChildren { .. } => (NotificationLevel::Warning, MSG_EXPAND_EMPTY),
            ExpansionOutcome::ExpandFailed { .. } => (NotificationLevel::Error, MSG_EXPAND_FAILED),
            ExpansionOutcome::Regenerated { .. } => (NotificationLevel::Success, MSG_REGENERATED),
            ExpansionOutcome::NoNewChildren { .. } => (NotificationLevel::Warning, MSG_REGENERATE_EMPTY),
            ExpansionOutcome::RegenerateFailed { .. } => (NotificationLevel::Error, MSG_REGENERATE_FAILED),
        };
        self.notifications.push(level, message);
    }

    fn request_quiz(&mut self, node: &str, quiz_config: QuizConfig) -> Result<OpenOutcome> {
        let context = self.started_navigator()?.context_path();
        self.reset_quiz();
        Ok(self.lesson.open(node, LessonMode::Quiz, Some(quiz_config), &context))
    }

    fn reset_quiz(&mut self) {
        self.clock.stop();
        self.quiz = None;
        self.quiz_failure = None;
    }

    fn started_navigator(&self) -> std::result::Result<&TopicNavigator, NavigationError> {
        self.navigator.as_ref().ok_or(NavigationError::NotStarted)
    }

    fn navigator_mut(&mut self) -> std::result::Result<&mut TopicNavigator, NavigationError> {
        self.navigator.as_mut().ok_or(NavigationError::NotStarted)
    }

    fn quiz_mut(&mut self) -> std::result::Result<&mut QuizSession, QuizError> {
        // a quiz that never parsed behaves like one with no questions
        self.quiz.as_mut().ok_or(QuizError::NoQuestions)
    }
}
