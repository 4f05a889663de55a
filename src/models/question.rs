// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The scenario text shown to the learner.
    pub prompt: String,

    /// Topical category, e.g. "Agile Frameworks" or "Hard Question".
    /// The partition key for weighted sampling.
    pub domain: String,

    /// Sampling weight. Higher scores are drawn more often.
    pub popularity_score: f64,

    /// Explanation of the correct answer, hidden until submission.
    pub explanation: String,

    /// Multi-select questions list every correct choice; the learner must pick all of them.
    pub is_multi_select: bool,
}

/// Represents the 'choices' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    /// A, B, C, D...
    pub label: String,
    pub text: String,
    pub is_correct: bool,
}

/// A question with its choices in label order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionWithChoices {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl QuestionWithChoices {
    /// Ids of the correct choices, in choice order.
    pub fn correct_choice_ids(&self) -> Vec<i64> {
        self.choices
            .iter()
            .filter(|c| c.is_correct)
            .map(|c| c.id)
            .collect()
    }
}

/// DTO for sending a choice to the client (excludes correctness).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicChoice {
    pub id: i64,
    pub label: String,
    pub text: String,
}

/// DTO for sending question to client (excludes answers and explanation).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub prompt: String,
    pub domain: String,
    pub is_multi_select: bool,
    pub choices: Vec<PublicChoice>,
}

impl From<QuestionWithChoices> for PublicQuestion {
    fn from(q: QuestionWithChoices) -> Self {
        Self {
            id: q.question.id,
            prompt: q.question.prompt,
            domain: q.question.domain,
            is_multi_select: q.question.is_multi_select,
            choices: q
                .choices
                .into_iter()
                .map(|c| PublicChoice {
                    id: c.id,
                    label: c.label,
                    text: c.text,
                })
                .collect(),
        }
    }
}
