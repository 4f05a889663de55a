// src/engine/error.rs

use thiserror::Error;

/// Failures raised by question selection, scoring and the attempt lifecycle.
///
/// Selection and scoring are deterministic, so none of these are retried:
/// repeating a call with the same seed would fail the same way.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error("blueprint for '{exam}' allocates {allocated} questions, expected {expected}")]
    BlueprintQuotaMismatch {
        exam: String,
        expected: usize,
        allocated: usize,
    },

    #[error("selected {selected} unique questions, expected {expected}")]
    SelectionCountMismatch { expected: usize, selected: usize },

    #[error("not enough questions available in domain {domain}: have {available}, need {requested}")]
    InsufficientQuestions {
        domain: String,
        available: usize,
        requested: usize,
    },

    #[error("question {0} is missing from the corpus")]
    QuestionMissing(i64),

    #[error("attempt not found")]
    AttemptNotFound,

    #[error("exam not found")]
    ExamNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("exam already submitted")]
    AlreadySubmitted,

    #[error("exam not yet submitted")]
    NotSubmitted,

    #[error("attempt already completed")]
    AlreadyClosed,

    #[error("user cannot modify this attempt")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ExamError {
    /// Blueprint tables that do not add up, or a selection that came out
    /// the wrong size.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ExamError::BlueprintQuotaMismatch { .. } | ExamError::SelectionCountMismatch { .. }
        )
    }

    /// The question bank cannot serve the request.
    pub fn is_insufficient_corpus(&self) -> bool {
        matches!(
            self,
            ExamError::InsufficientQuestions { .. } | ExamError::QuestionMissing(_)
        )
    }
}
