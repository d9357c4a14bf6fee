//! Landing-screen entry points: pick a topic and open the explorer

use std::sync::Arc;

use super::models::ModelCatalog;
use crate::error::Result;
use crate::models::{NotificationLevel, NotificationLog};
use crate::services::{Backend, Config};
use crate::state::{EventReceiver, Workspace};

pub const MSG_RANDOM_FAILED: &str = "Failed to generate random topic";

pub fn suggested_topics(config: &Config) -> &[String] {
    &config.suggested_topics
}

/// Ask the backend for a random starting topic.
///
/// Failures, including a blank topic, are reported as a toast and yield `None`.
pub async fn surprise_topic(
    backend: &dyn Backend,
    model: &str,
    notifications: &mut NotificationLog,
) -> Option<String> {
    if model.is_empty() {
        return None;
    }

    match backend.random_topic(model).await {
        Ok(topic) if !topic.trim().is_empty() => Some(topic.trim().to_string()),
        Ok(_) => {
            tracing::warn!("Backend returned a blank random topic");
            notifications.push(NotificationLevel::Error, MSG_RANDOM_FAILED);
            None
        }
        Err(e) => {
            tracing::error!("Random topic failed: {}", e);
            notifications.push(NotificationLevel::Error, MSG_RANDOM_FAILED);
            None
        }
    }
}

/// Open the explorer on `topic` with the catalog's current model
pub fn start_workspace(
    config: Arc<Config>,
    backend: Arc<dyn Backend>,
    catalog: &ModelCatalog,
    topic: &str,
) -> Result<(Workspace, EventReceiver)> {
    let model = catalog.selected().unwrap_or_default().to_string();
    Workspace::start(config, backend, &model, topic)
}
