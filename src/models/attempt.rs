// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'attempts' table in the database.
///
/// The question list is not stored; it is rebuilt from the exam name,
/// `seed` and `max_score` whenever it is needed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub user_id: Uuid,
    pub seed: i64,
    /// Null until the attempt is submitted.
    pub score: Option<i32>,
    /// Number of questions in the attempt.
    pub max_score: i32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn is_open(&self) -> bool {
        self.score.is_none() && self.ended_at.is_none()
    }

    pub fn question_count(&self) -> usize {
        usize::try_from(self.max_score).unwrap_or(0)
    }
}

/// Represents the 'attempt_answers' table: one row per selected choice.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: i64,
    pub choice_id: Option<i64>,
    /// Verdict for the whole question, repeated on each of its rows.
    pub is_correct: Option<bool>,
}

/// Answer row to be written during submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttemptAnswer {
    pub question_id: i64,
    pub choice_id: i64,
    pub is_correct: bool,
}

/// DTO for submitting an attempt.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExamSubmission {
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    #[serde(default)]
    pub choice_ids: Vec<i64>,
}

/// Row of a user's attempt history, joined with the exam name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttemptHistory {
    pub attempt_id: Uuid,
    pub exam_id: Uuid,
    pub exam_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub score: Option<i32>,
    pub max_score: i32,
    #[sqlx(skip)]
    pub question_count: i32,
    #[sqlx(skip)]
    pub attempt_type: String,
}

/// DTO returned when an attempt is started.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartAttemptResponse {
    pub attempt_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub question_count: i32,
}

/// DTO for deleting an open attempt.
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteAttemptRequest {
    pub user_id: Uuid,
}
