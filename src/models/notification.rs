use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest notifications are dropped past this many
const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient toast for the host UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
    next_id: u64,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> &Notification {
        self.next_id += 1;
        if self.entries.len() == MAX_NOTIFICATIONS {
            self.entries.remove(0);
        }
        self.entries.push(Notification {
            id: self.next_id,
            level,
            message: message.into(),
            created_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.last()
    }

    /// Remove and return everything, for hosts that display each toast once
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }
}
