use serde::{Deserialize, Serialize};

/// Raw quiz payload as produced by the backend in quiz mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizPayload {
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_index: usize,
    /// `None` when the question timed out
    pub selected_index: Option<usize>,
    pub was_correct: bool,
    pub was_timeout: bool,
}

/// One row of the end-of-quiz review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReviewItem {
    pub question: String,
    pub chosen: Option<String>,
    pub correct: String,
    pub was_correct: bool,
    pub was_timeout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub score: usize,
    pub question_count: usize,
    pub percentage: u32,
    pub passed: bool,
    pub answer_log: Vec<AnswerRecord>,
    pub review: Vec<QuizReviewItem>,
}
