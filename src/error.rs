//! Error types for each layer of the client core

use thiserror::Error;

/// Result type alias using the crate-level [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error, mostly a funnel for the per-layer errors below
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error("Topic must not be empty")]
    EmptyTopic,

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Failures talking to the generation backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Backend returned an empty topic")]
    EmptyTopic,

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Failures loading or saving the persisted client configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find data directory")]
    NoDataDir,

    #[error("Failed to access config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected topic-tree operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("An expansion is already in flight")]
    Busy,

    #[error("Column {index} does not exist (tree has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("Node '{name}' is not part of column {column}")]
    UnknownNode { column: usize, name: String },

    #[error("The root column cannot be regenerated")]
    RootRegeneration,

    #[error("No topic tree has been started")]
    NotStarted,
}

/// Failures turning accumulated text into structured data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No JSON value found in text")]
    NotFound,

    #[error("Embedded JSON could not be parsed: {0}")]
    Malformed(String),

    #[error("Unexpected payload shape: {0}")]
    Shape(String),
}

/// Rejected quiz interactions and invalid quiz payloads
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error(transparent)]
    Payload(#[from] ExtractError),

    #[error("Quiz payload has no questions")]
    NoQuestions,

    #[error("Question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    #[error("Question {0} has already been answered")]
    AlreadyAnswered(usize),

    #[error("Option {option} does not exist for question {question}")]
    OptionOutOfRange { question: usize, option: usize },

    #[error("Quiz is finished")]
    Finished,

    #[error("Question {0} has not been answered yet")]
    NotAnswered(usize),
}
