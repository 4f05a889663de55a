// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::question::QuestionWithChoices;

/// Graded outcome of a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: QuestionWithChoices,
    pub user_choice_ids: Vec<i64>,
    pub correct_choice_ids: Vec<i64>,
    pub is_correct: bool,
}

/// A submitted attempt with every question resolved.
/// Input to the report renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub attempt_id: Uuid,
    pub user_id: Uuid,
    pub exam_id: Uuid,
    pub exam_name: String,
    pub score: i32,
    pub max_score: i32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub results: Vec<QuestionResult>,
}

impl ExamResult {
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0 {
            return 0.0;
        }
        self.score as f64 / self.max_score as f64 * 100.0
    }
}
