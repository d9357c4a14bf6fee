use serde::{Deserialize, Serialize};

/// A single entry of a history-mode timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub year: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}
