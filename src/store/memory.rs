// src/store/memory.rs

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use uuid::Uuid;

use super::{AttemptStore, QuestionCorpus};
use crate::{
    engine::{ExamError, sampler::WeightedCandidate},
    models::{
        attempt::{Attempt, AttemptAnswer, AttemptHistory, NewAttemptAnswer},
        exam::Exam,
        question::QuestionWithChoices,
        user::User,
    },
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    exams: Vec<Exam>,
    attempts: Vec<Attempt>,
    answers: Vec<AttemptAnswer>,
}

/// In-process store with the same guarantees as [`super::postgres::PgStore`].
///
/// The question bank is fixed at construction. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    questions: Arc<Vec<QuestionWithChoices>>,
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn with_questions(questions: Vec<QuestionWithChoices>) -> Self {
        Self {
            questions: Arc::new(questions),
            tables: Arc::default(),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl QuestionCorpus for MemoryStore {
    async fn domain_candidates(
        &self,
        domain: &str,
        exclude: &HashSet<i64>,
    ) -> Result<Vec<WeightedCandidate>, ExamError> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.question.domain == domain && !exclude.contains(&q.question.id))
            .map(|q| WeightedCandidate::new(q.question.id, q.question.popularity_score))
            .collect())
    }

    async fn questions_with_choices(
        &self,
        ids: &[i64],
    ) -> Result<Vec<QuestionWithChoices>, ExamError> {
        let by_id: HashMap<i64, &QuestionWithChoices> =
            self.questions.iter().map(|q| (q.question.id, q)).collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|q| (*q).clone()))
            .collect())
    }

    async fn random_domain_questions(
        &self,
        domain: &str,
        count: usize,
    ) -> Result<Vec<QuestionWithChoices>, ExamError> {
        let mut matching: Vec<QuestionWithChoices> = self
            .questions
            .iter()
            .filter(|q| q.question.domain == domain)
            .cloned()
            .collect();

        matching.shuffle(&mut rand::thread_rng());
        matching.truncate(count);
        Ok(matching)
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn get_or_create_user(&self, email: &str, name: &str) -> Result<User, ExamError> {
        let mut tables = self.tables();
        if let Some(user) = tables.users.iter().find(|u| u.email == email) {
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ExamError> {
        Ok(self.tables().users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_or_create_exam(&self, name: &str, description: &str) -> Result<Exam, ExamError> {
        let mut tables = self.tables();
        if let Some(exam) = tables.exams.iter().find(|e| e.name == name) {
            return Ok(exam.clone());
        }

        let exam = Exam {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        tables.exams.push(exam.clone());
        Ok(exam)
    }

    async fn find_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, ExamError> {
        Ok(self.tables().exams.iter().find(|e| e.id == exam_id).cloned())
    }

    async fn create_attempt(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
        seed: i64,
        max_score: i32,
    ) -> Result<Attempt, ExamError> {
        let attempt = Attempt {
            id: Uuid::new_v4(),
            exam_id,
            user_id,
            seed,
            score: None,
            max_score,
            started_at: Utc::now(),
            ended_at: None,
        };
        self.tables().attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn find_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, ExamError> {
        Ok(self
            .tables()
            .attempts
            .iter()
            .find(|a| a.id == attempt_id)
            .cloned())
    }

    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        score: i32,
        answers: &[NewAttemptAnswer],
    ) -> Result<Attempt, ExamError> {
        let mut tables = self.tables();

        let attempt = tables
            .attempts
            .iter_mut()
            .find(|a| a.id == attempt_id)
            .ok_or(ExamError::AttemptNotFound)?;
        if attempt.ended_at.is_some() {
            return Err(ExamError::AlreadySubmitted);
        }
        attempt.score = Some(score);
        attempt.ended_at = Some(Utc::now());
        let closed = attempt.clone();

        tables.answers.extend(answers.iter().map(|a| AttemptAnswer {
            id: Uuid::new_v4(),
            attempt_id,
            question_id: a.question_id,
            choice_id: Some(a.choice_id),
            is_correct: Some(a.is_correct),
        }));

        Ok(closed)
    }

    async fn attempt_answers(&self, attempt_id: Uuid) -> Result<Vec<AttemptAnswer>, ExamError> {
        let mut rows: Vec<AttemptAnswer> = self
            .tables()
            .answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.question_id);
        Ok(rows)
    }

    async fn delete_open_attempt(&self, attempt_id: Uuid, user_id: Uuid) -> Result<bool, ExamError> {
        let mut tables = self.tables();
        let before = tables.attempts.len();
        tables
            .attempts
            .retain(|a| !(a.id == attempt_id && a.user_id == user_id && a.is_open()));

        let removed = tables.attempts.len() < before;
        if removed {
            tables.answers.retain(|a| a.attempt_id != attempt_id);
        }
        Ok(removed)
    }

    async fn attempts_by_user(&self, user_id: Uuid) -> Result<Vec<AttemptHistory>, ExamError> {
        let tables = self.tables();
        let mut history: Vec<AttemptHistory> = tables
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| AttemptHistory {
                attempt_id: a.id,
                exam_id: a.exam_id,
                exam_name: tables
                    .exams
                    .iter()
                    .find(|e| e.id == a.exam_id)
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
                started_at: a.started_at,
                ended_at: a.ended_at,
                score: a.score,
                max_score: a.max_score,
                question_count: 0,
                attempt_type: String::new(),
            })
            .collect();

        history.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(history)
    }
}
