//! Timed multiple-choice quiz built from a completed quiz-mode lesson.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::{EventSender, WorkspaceEvent};
use crate::error::{ExtractError, QuizError};
use crate::models::{AnswerRecord, QuizPayload, QuizQuestion, QuizReviewItem, QuizSummary};
use crate::services::json_extract::{extract_json, Shape};

/// Minimum percentage for a passing grade
const PASS_PERCENTAGE: u32 = 70;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is counting down
    Idle,
    /// Seconds left on the current question
    Counting(u32),
    TimedOut(AnswerRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizProgress {
    Next(usize),
    Finished,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    time_budget: u32,
    current: usize,
    selected: Option<usize>,
    answered: bool,
    score: usize,
    streak: usize,
    time_remaining: u32,
    answer_log: Vec<AnswerRecord>,
    finished: bool,
}

impl QuizSession {
    pub fn from_payload(payload: QuizPayload, time_budget: u32) -> Result<Self, QuizError> {
        if payload.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        for (index, question) in payload.questions.iter().enumerate() {
            validate_question(index, question)?;
        }

        Ok(Self {
            questions: payload.questions,
            time_budget,
            current: 0,
            selected: None,
            answered: false,
            score: 0,
            streak: 0,
            time_remaining: time_budget,
            answer_log: Vec::new(),
            finished: false,
        })
    }

    /// Parse the accumulated text of a quiz-mode lesson
    pub fn from_content(text: &str, time_budget: u32) -> Result<Self, QuizError> {
        let value = extract_json(text, Shape::Object)?;
        let payload: QuizPayload =
            serde_json::from_value(value).map_err(|e| ExtractError::Shape(e.to_string()))?;
        Self::from_payload(payload, time_budget)
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current]
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn streak(&self) -> usize {
        self.streak
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn answer_log(&self) -> &[AnswerRecord] {
        &self.answer_log
    }

    /// Whether the current question already has an answer or timeout recorded
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the per-question timer should be running
    pub fn is_counting(&self) -> bool {
        !self.finished && !self.answered && self.time_remaining > 0
    }

    pub fn answer(&mut self, option: usize) -> Result<AnswerRecord, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        if self.answered {
            return Err(QuizError::AlreadyAnswered(self.current));
        }
        if option >= self.current_question().options.len() {
            return Err(QuizError::OptionOutOfRange {
                question: self.current,
                option,
            });
        }

        let correct = option == self.current_question().correct_index;
        self.selected = Some(option);
        Ok(self.record(Some(option), correct))
    }

    /// One unit of the per-question countdown
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_counting() {
            return TickOutcome::Idle;
        }
        self.time_remaining -= 1;
        if self.time_remaining > 0 {
            return TickOutcome::Counting(self.time_remaining);
        }

        tracing::debug!("Question {} timed out", self.current);
        TickOutcome::TimedOut(self.record(None, false))
    }

    pub fn advance(&mut self) -> Result<QuizProgress, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        if !self.answered {
            return Err(QuizError::NotAnswered(self.current));
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
            self.answered = false;
            self.time_remaining = self.time_budget;
            return Ok(QuizProgress::Next(self.current));
        }

        self.finished = true;
        tracing::info!(
            "Quiz finished: {}/{} correct",
            self.score,
            self.questions.len()
        );
        Ok(QuizProgress::Finished)
    }

    /// Start over on the same questions
    pub fn restart(&mut self) {
        self.current = 0;
        self.selected = None;
        self.answered = false;
        self.score = 0;
        self.streak = 0;
        self.time_remaining = self.time_budget;
        self.answer_log.clear();
        self.finished = false;
    }

    /// Final results, available once the quiz is finished
    pub fn summary(&self) -> Option<QuizSummary> {
        if !self.finished {
            return None;
        }

        let question_count = self.questions.len();
        let percentage = (100.0 * self.score as f64 / question_count as f64).round() as u32;
        let review = self
            .answer_log
            .iter()
            .map(|record| {
                let question = &self.questions[record.question_index];
                QuizReviewItem {
                    question: question.question.clone(),
                    chosen: record.selected_index.map(|i| question.options[i].clone()),
                    correct: question.options[question.correct_index].clone(),
                    was_correct: record.was_correct,
                    was_timeout: record.was_timeout,
                }
            })
            .collect();

        Some(QuizSummary {
            score: self.score,
            question_count,
            percentage,
            passed: percentage >= PASS_PERCENTAGE,
            answer_log: self.answer_log.clone(),
            review,
        })
    }

    fn record(&mut self, selected_index: Option<usize>, was_correct: bool) -> AnswerRecord {
        if was_correct {
            self.score += 1;
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        self.answered = true;

        let record = AnswerRecord {
            question_index: self.current,
            selected_index,
            was_correct,
            was_timeout: selected_index.is_none(),
        };
        self.answer_log.push(record.clone());
        record
    }
}

fn validate_question(index: usize, question: &QuizQuestion) -> Result<(), QuizError> {
    let invalid = |reason: &str| QuizError::InvalidQuestion {
        index,
        reason: reason.to_string(),
    };

    if question.question.trim().is_empty() {
        return Err(invalid("prompt is empty"));
    }
    if question.options.is_empty() {
        return Err(invalid("no options"));
    }
    if question.correct_index >= question.options.len() {
        return Err(invalid("correct_index is out of range"));
    }
    Ok(())
}

/// Per-question countdown driver.
///
/// Each [`start`](QuizClock::start) spawns an interval task that emits
/// [`WorkspaceEvent::QuizTick`] tagged with a fresh generation; ticks from
/// an older generation, or arriving after [`stop`](QuizClock::stop), are
/// stale and must be ignored by the receiver.
pub struct QuizClock {
    period: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl QuizClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            handle: None,
        }
    }

    pub fn start(&mut self, events: &EventSender) -> u64 {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let period = self.period;
        let events = events.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if events.send(WorkspaceEvent::QuizTick { generation }).is_err() {
                    break;
                }
            }
        }));
        generation
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }
}

impl Drop for QuizClock {
    fn drop(&mut self) {
        self.stop();
    }
}
