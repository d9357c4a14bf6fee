//! Long-lived client state: the topic tree, the lesson panel, the quiz.
//!
//! Every asynchronous operation runs as a spawned task that reports back
//! through a [`WorkspaceEvent`]; the host pumps the receiver returned by
//! [`Workspace::start`] and feeds each event to [`Workspace::handle_event`].
//! All mutation therefore happens on the host's single event loop.

mod lesson_controller;
mod navigator;
mod quiz_session;
mod workspace;

use tokio::sync::mpsc;

pub use lesson_controller::{LessonController, LessonEvent, LessonUpdate, LessonView, OpenOutcome};
pub use navigator::{ExpansionOutcome, ExpansionReply, SelectOutcome, TopicNavigator};
pub use quiz_session::{QuizClock, QuizProgress, QuizSession, TickOutcome};
pub use workspace::Workspace;

/// Results of background work, delivered to the owning state machine
#[derive(Debug)]
pub enum WorkspaceEvent {
    Expansion(ExpansionReply),
    Lesson(LessonEvent),
    QuizTick { generation: u64 },
}

pub type EventSender = mpsc::UnboundedSender<WorkspaceEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<WorkspaceEvent>;
