use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Content shown in place of a lesson whose request failed
pub const FAILED_LESSON_PLACEHOLDER: &str = "Connection lost.";

/// Words per minute used for the reading-time estimate
const READING_WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonMode {
    Explain,
    History,
    Impact,
    Eli5,
    Future,
    Code,
    ProsCons,
    Debate,
    Quiz,
}

/// How the accumulated text of a mode is turned into something displayable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Markdown rendered as it arrives
    Prose,
    /// JSON timeline, parsed once the stream ends
    Timeline,
    /// JSON quiz, parsed once the stream ends
    Quiz,
}

impl LessonMode {
    /// Tab order of the lesson panel
    pub const ALL: [LessonMode; 9] = [
        LessonMode::Explain,
        LessonMode::History,
        LessonMode::Impact,
        LessonMode::Eli5,
        LessonMode::Future,
        LessonMode::Code,
        LessonMode::ProsCons,
        LessonMode::Debate,
        LessonMode::Quiz,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LessonMode::Explain => "explain",
            LessonMode::History => "history",
            LessonMode::Impact => "impact",
            LessonMode::Eli5 => "eli5",
            LessonMode::Future => "future",
            LessonMode::Code => "code",
            LessonMode::ProsCons => "proscons",
            LessonMode::Debate => "debate",
            LessonMode::Quiz => "quiz",
        }
    }

    pub fn content_kind(self) -> ContentKind {
        match self {
            LessonMode::History => ContentKind::Timeline,
            LessonMode::Quiz => ContentKind::Quiz,
            _ => ContentKind::Prose,
        }
    }

    /// Whether the session stays in `Loading` until the stream ends instead
    /// of moving to `Streaming` on the first chunk.
    pub fn holds_loading_until_complete(self) -> bool {
        self.content_kind() == ContentKind::Timeline
    }
}

impl fmt::Display for LessonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    pub difficulty: Difficulty,
    pub question_count: u8,
}

impl QuizConfig {
    pub const MIN_QUESTIONS: u8 = 3;
    pub const MAX_QUESTIONS: u8 = 10;

    pub fn new(difficulty: Difficulty, question_count: u8) -> Self {
        Self {
            difficulty,
            question_count: question_count.clamp(Self::MIN_QUESTIONS, Self::MAX_QUESTIONS),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::new(Difficulty::Medium, 5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStage {
    Config,
    Loading,
    Streaming,
    Complete,
    Error,
}

impl LessonStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, LessonStage::Complete | LessonStage::Error)
    }
}

/// The single open content request/view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSession {
    pub target_node_name: String,
    pub mode: LessonMode,
    pub stage: LessonStage,
    pub content: String,
    pub quiz_config: Option<QuizConfig>,
    /// Identity of the request feeding this session, if one was issued
    pub request_id: Option<Uuid>,
}

impl LessonSession {
    pub fn awaiting_config(node: &str) -> Self {
        Self {
            target_node_name: node.to_string(),
            mode: LessonMode::Quiz,
            stage: LessonStage::Config,
            content: String::new(),
            quiz_config: None,
            request_id: None,
        }
    }

    pub fn loading(node: &str, mode: LessonMode, quiz_config: Option<QuizConfig>, request_id: Uuid) -> Self {
        Self {
            target_node_name: node.to_string(),
            mode,
            stage: LessonStage::Loading,
            content: String::new(),
            quiz_config,
            request_id: Some(request_id),
        }
    }

    /// Estimated minutes to read the content, zero while it is blank
    pub fn reading_time_minutes(&self) -> usize {
        if self.content.trim().is_empty() {
            return 0;
        }
        let words = self.content.split_whitespace().count();
        words.div_ceil(READING_WORDS_PER_MINUTE)
    }
}
