//! Client core of the OmniWeb knowledge-tree explorer.
//!
//! The host UI builds a [`Workspace`] for a starting topic, pumps the event
//! receiver it is given, and renders the navigator, lesson panel and quiz
//! state after each [`Workspace::handle_event`]. Landing-screen helpers
//! (model picker, surprise topic, persisted settings) live in [`commands`].

pub mod commands;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use error::{BackendError, Error, Result};
pub use services::{Backend, Config, HttpBackend};
pub use state::{EventReceiver, Workspace, WorkspaceEvent};
