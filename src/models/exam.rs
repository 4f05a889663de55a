// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    config::{FULL_EXAM_QUESTION_COUNT, HARD_DRILL_QUESTION_COUNT, SHORT_QUIZ_QUESTION_COUNT},
    engine::blueprint::{CAPM_EXAM_NAME, HARD_DRILL_EXAM_NAME, PMP_EXAM_NAME},
};

/// Represents the 'exams' table in the database.
/// The name selects the blueprint used for the exam's attempts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// The attempts a learner can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamKind {
    MockExam,
    ShortQuiz,
    Pmp,
    HardDrill,
}

impl ExamKind {
    pub fn exam_name(self) -> &'static str {
        match self {
            ExamKind::MockExam | ExamKind::ShortQuiz => CAPM_EXAM_NAME,
            ExamKind::Pmp => PMP_EXAM_NAME,
            ExamKind::HardDrill => HARD_DRILL_EXAM_NAME,
        }
    }

    /// Description stored when the exam record is first created.
    pub fn description(self) -> &'static str {
        match self {
            ExamKind::MockExam | ExamKind::ShortQuiz => {
                "150-question CAPM certification practice exam"
            }
            ExamKind::Pmp => "150-question PMP scenario exam",
            ExamKind::HardDrill => "20-question advanced CAPM scenario drill",
        }
    }

    pub fn question_count(self) -> usize {
        match self {
            ExamKind::MockExam | ExamKind::Pmp => FULL_EXAM_QUESTION_COUNT,
            ExamKind::ShortQuiz => SHORT_QUIZ_QUESTION_COUNT,
            ExamKind::HardDrill => HARD_DRILL_QUESTION_COUNT,
        }
    }
}

/// Topic drills: random questions from a dedicated domain, nothing persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrillKind {
    EarnedValue,
    Pert,
    StakeholderSalience,
    ProjectOperations,
    TeamMotivation,
}

impl DrillKind {
    pub fn domain(self) -> &'static str {
        match self {
            DrillKind::EarnedValue => "Earned Value Drill",
            DrillKind::Pert => "PERT Drill",
            DrillKind::StakeholderSalience => "Stakeholder Salience Drill",
            DrillKind::ProjectOperations => "Project Operations Classification Drill",
            DrillKind::TeamMotivation => "Team Motivation Drill",
        }
    }

    /// (default, max) question counts.
    fn limits(self) -> (usize, usize) {
        match self {
            DrillKind::EarnedValue | DrillKind::Pert | DrillKind::StakeholderSalience => (10, 50),
            DrillKind::ProjectOperations => (15, 20),
            DrillKind::TeamMotivation => (20, 20),
        }
    }

    /// Missing or non-positive counts take the default; large ones are capped.
    pub fn clamp_count(self, requested: Option<i64>) -> usize {
        let (default, max) = self.limits();
        match requested {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(max).min(max),
            _ => default,
        }
    }
}

/// Query parameters for drill requests.
#[derive(Debug, Default, Deserialize)]
pub struct DrillQuery {
    pub count: Option<i64>,
}
