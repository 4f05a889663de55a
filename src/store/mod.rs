// src/store/mod.rs

//! Persistence seams used by the exam service.
//!
//! [`postgres::PgStore`] backs the running server; [`memory::MemoryStore`]
//! keeps everything in process for tests and local demos.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    engine::{ExamError, sampler::WeightedCandidate},
    models::{
        attempt::{Attempt, AttemptAnswer, AttemptHistory, NewAttemptAnswer},
        exam::Exam,
        question::QuestionWithChoices,
        user::User,
    },
};

pub mod memory;
pub mod postgres;

/// Read access to the question bank.
#[async_trait]
pub trait QuestionCorpus: Send + Sync {
    /// Ids and weights of every question in `domain` not in `exclude`.
    async fn domain_candidates(
        &self,
        domain: &str,
        exclude: &HashSet<i64>,
    ) -> Result<Vec<WeightedCandidate>, ExamError>;

    /// Questions with their choices, in the order of `ids`. Unknown ids are skipped.
    async fn questions_with_choices(
        &self,
        ids: &[i64],
    ) -> Result<Vec<QuestionWithChoices>, ExamError>;

    /// Up to `count` questions from `domain` in no particular order.
    async fn random_domain_questions(
        &self,
        domain: &str,
        count: usize,
    ) -> Result<Vec<QuestionWithChoices>, ExamError>;
}

/// Users, exams, attempts and their answer rows.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn get_or_create_user(&self, email: &str, name: &str) -> Result<User, ExamError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ExamError>;

    async fn get_or_create_exam(&self, name: &str, description: &str) -> Result<Exam, ExamError>;

    async fn find_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, ExamError>;

    async fn create_attempt(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
        seed: i64,
        max_score: i32,
    ) -> Result<Attempt, ExamError>;

    async fn find_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, ExamError>;

    /// Closes an open attempt with `score` and writes its answer rows in one
    /// step. Fails with `AlreadySubmitted` when the attempt was closed first.
    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        score: i32,
        answers: &[NewAttemptAnswer],
    ) -> Result<Attempt, ExamError>;

    async fn attempt_answers(&self, attempt_id: Uuid) -> Result<Vec<AttemptAnswer>, ExamError>;

    /// Deletes an attempt only if it is still open and owned by `user_id`.
    /// Returns whether a row was removed.
    async fn delete_open_attempt(&self, attempt_id: Uuid, user_id: Uuid) -> Result<bool, ExamError>;

    /// Attempts of `user_id`, newest first.
    async fn attempts_by_user(&self, user_id: Uuid) -> Result<Vec<AttemptHistory>, ExamError>;
}

/// Everything the exam service needs from storage.
pub trait ExamStore: QuestionCorpus + AttemptStore {
    fn as_corpus(&self) -> &dyn QuestionCorpus;
}

impl<T: QuestionCorpus + AttemptStore> ExamStore for T {
    fn as_corpus(&self) -> &dyn QuestionCorpus {
        self
    }
}
