// src/store/postgres.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{AttemptStore, QuestionCorpus};
use crate::{
    engine::{ExamError, sampler::WeightedCandidate},
    models::{
        attempt::{Attempt, AttemptAnswer, AttemptHistory, NewAttemptAnswer},
        exam::Exam,
        question::{Choice, Question, QuestionWithChoices},
        user::User,
    },
};

/// Flat row of the question/choice join.
#[derive(FromRow)]
struct QuestionChoiceRow {
    id: i64,
    prompt: String,
    domain: String,
    popularity_score: f64,
    explanation: String,
    is_multi_select: bool,
    choice_id: i64,
    label: String,
    text: String,
    is_correct: bool,
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_questions(&self, ids: &[i64]) -> Result<Vec<QuestionWithChoices>, ExamError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<QuestionChoiceRow> = sqlx::query_as(
            r#"
            SELECT
                q.id, q.prompt, q.domain, q.popularity_score, q.explanation, q.is_multi_select,
                c.id AS choice_id, c.label, c.text, c.is_correct
            FROM questions q
            JOIN choices c ON c.question_id = q.id
            WHERE q.id = ANY($1)
            ORDER BY q.id, c.label, c.id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions with choices: {:?}", e);
            ExamError::from(e)
        })?;

        let mut by_id: HashMap<i64, QuestionWithChoices> = HashMap::new();
        for row in rows {
            let entry = by_id.entry(row.id).or_insert_with(|| QuestionWithChoices {
                question: Question {
                    id: row.id,
                    prompt: row.prompt,
                    domain: row.domain,
                    popularity_score: row.popularity_score,
                    explanation: row.explanation,
                    is_multi_select: row.is_multi_select,
                },
                choices: Vec::new(),
            });
            entry.choices.push(Choice {
                id: row.choice_id,
                question_id: row.id,
                label: row.label,
                text: row.text,
                is_correct: row.is_correct,
            });
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[async_trait]
impl QuestionCorpus for PgStore {
    async fn domain_candidates(
        &self,
        domain: &str,
        exclude: &HashSet<i64>,
    ) -> Result<Vec<WeightedCandidate>, ExamError> {
        let exclude: Vec<i64> = exclude.iter().copied().collect();

        sqlx::query_as::<_, WeightedCandidate>(
            r#"
            SELECT id, popularity_score AS weight
            FROM questions
            WHERE domain = $1 AND NOT (id = ANY($2))
            ORDER BY popularity_score DESC, id ASC
            "#,
        )
        .bind(domain)
        .bind(&exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load candidates for domain {}: {:?}", domain, e);
            ExamError::from(e)
        })
    }

    async fn questions_with_choices(
        &self,
        ids: &[i64],
    ) -> Result<Vec<QuestionWithChoices>, ExamError> {
        self.load_questions(ids).await
    }

    async fn random_domain_questions(
        &self,
        domain: &str,
        count: usize,
    ) -> Result<Vec<QuestionWithChoices>, ExamError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM questions
            WHERE domain = $1
            ORDER BY RANDOM()
            LIMIT $2
            "#,
        )
        .bind(domain)
        .bind(count as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to select drill questions for {}: {:?}", domain, e);
            ExamError::from(e)
        })?;

        self.load_questions(&ids).await
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn get_or_create_user(&self, email: &str, name: &str) -> Result<User, ExamError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get or create user: {:?}", e);
            ExamError::from(e)
        })
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ExamError> {
        sqlx::query_as::<_, User>("SELECT id, email, name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ExamError::from)
    }

    async fn get_or_create_exam(&self, name: &str, description: &str) -> Result<Exam, ExamError> {
        sqlx::query_as::<_, Exam>(
            r#"
            INSERT INTO exams (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get or create exam {}: {:?}", name, e);
            ExamError::from(e)
        })
    }

    async fn find_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, ExamError> {
        sqlx::query_as::<_, Exam>(
            "SELECT id, name, description, created_at FROM exams WHERE id = $1",
        )
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ExamError::from)
    }

    async fn create_attempt(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
        seed: i64,
        max_score: i32,
    ) -> Result<Attempt, ExamError> {
        sqlx::query_as::<_, Attempt>(
            r#"
            INSERT INTO attempts (id, user_id, exam_id, seed, max_score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, exam_id, user_id, seed, score, max_score, started_at, ended_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(exam_id)
        .bind(seed)
        .bind(max_score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create attempt: {:?}", e);
            ExamError::from(e)
        })
    }

    async fn find_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, ExamError> {
        sqlx::query_as::<_, Attempt>(
            r#"
            SELECT id, exam_id, user_id, seed, score, max_score, started_at, ended_at
            FROM attempts
            WHERE id = $1
            "#,
        )
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ExamError::from)
    }

    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        score: i32,
        answers: &[NewAttemptAnswer],
    ) -> Result<Attempt, ExamError> {
        let mut tx = self.pool.begin().await?;

        // Guarded on ended_at so a concurrent second submission updates nothing.
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            UPDATE attempts
            SET score = $1, ended_at = NOW()
            WHERE id = $2 AND ended_at IS NULL
            RETURNING id, exam_id, user_id, seed, score, max_score, started_at, ended_at
            "#,
        )
        .bind(score)
        .bind(attempt_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ExamError::AlreadySubmitted)?;

        for answer in answers {
            sqlx::query(
                r#"
                INSERT INTO attempt_answers (id, attempt_id, question_id, choice_id, is_correct)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(attempt_id)
            .bind(answer.question_id)
            .bind(answer.choice_id)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert attempt answer: {:?}", e);
                ExamError::from(e)
            })?;
        }

        tx.commit().await?;
        Ok(attempt)
    }

    async fn attempt_answers(&self, attempt_id: Uuid) -> Result<Vec<AttemptAnswer>, ExamError> {
        sqlx::query_as::<_, AttemptAnswer>(
            r#"
            SELECT id, attempt_id, question_id, choice_id, is_correct
            FROM attempt_answers
            WHERE attempt_id = $1
            ORDER BY question_id, created_at
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch attempt answers: {:?}", e);
            ExamError::from(e)
        })
    }

    async fn delete_open_attempt(&self, attempt_id: Uuid, user_id: Uuid) -> Result<bool, ExamError> {
        // Answer rows go with the attempt through ON DELETE CASCADE.
        let result = sqlx::query(
            "DELETE FROM attempts WHERE id = $1 AND user_id = $2 AND ended_at IS NULL AND score IS NULL",
        )
        .bind(attempt_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete attempt: {:?}", e);
            ExamError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn attempts_by_user(&self, user_id: Uuid) -> Result<Vec<AttemptHistory>, ExamError> {
        sqlx::query_as::<_, AttemptHistory>(
            r#"
            SELECT
                a.id AS attempt_id,
                a.exam_id,
                e.name AS exam_name,
                a.started_at,
                a.ended_at,
                a.score,
                a.max_score
            FROM attempts a
            JOIN exams e ON e.id = a.exam_id
            WHERE a.user_id = $1
            ORDER BY a.started_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch attempt history: {:?}", e);
            ExamError::from(e)
        })
    }
}
