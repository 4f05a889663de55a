// src/services/exam.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    engine::{
        ExamError, QuestionSelector,
        blueprint::{HARD_DRILL_EXAM_NAME, PMP_EXAM_NAME, SHORT_QUIZ_LIMIT},
        scoring,
    },
    models::{
        attempt::{Attempt, AttemptHistory, ExamSubmission},
        exam::{DrillKind, Exam, ExamKind},
        question::{PublicQuestion, QuestionWithChoices},
        result::ExamResult,
        user::User,
    },
    store::ExamStore,
};

/// Attempt lifecycle on top of a store and the question selector.
///
/// Holds no per-attempt state; every call re-derives the question list
/// from the attempt's seed.
#[derive(Clone)]
pub struct ExamService {
    store: Arc<dyn ExamStore>,
    selector: QuestionSelector,
}

impl ExamService {
    pub fn new(store: Arc<dyn ExamStore>, selector: QuestionSelector) -> Self {
        Self { store, selector }
    }

    pub async fn get_or_create_user(&self, email: &str, name: &str) -> Result<User, ExamError> {
        self.store.get_or_create_user(email, name).await
    }

    /// Creates an attempt for `kind` with a fresh seed.
    ///
    /// The blueprint is resolved before anything is written, so a size the
    /// exam cannot serve never produces an attempt.
    pub async fn start_attempt(&self, user_id: Uuid, kind: ExamKind) -> Result<Attempt, ExamError> {
        let question_count = kind.question_count();
        self.selector.plan(kind.exam_name(), question_count)?;

        let exam = self
            .store
            .get_or_create_exam(kind.exam_name(), kind.description())
            .await?;

        let seed = rand::random::<i64>();
        let max_score = i32::try_from(question_count).unwrap_or(i32::MAX);

        let attempt = self
            .store
            .create_attempt(user_id, exam.id, seed, max_score)
            .await?;

        tracing::info!(
            attempt_id = %attempt.id,
            exam = %exam.name,
            question_count,
            "Attempt started"
        );
        Ok(attempt)
    }

    async fn load_attempt(&self, attempt_id: Uuid) -> Result<(Attempt, Exam), ExamError> {
        let attempt = self
            .store
            .find_attempt(attempt_id)
            .await?
            .ok_or(ExamError::AttemptNotFound)?;

        let exam = self
            .store
            .find_exam(attempt.exam_id)
            .await?
            .ok_or(ExamError::ExamNotFound)?;

        Ok((attempt, exam))
    }

    /// Re-derives the attempt's questions, in presentation order, with choices.
    async fn attempt_questions(
        &self,
        attempt: &Attempt,
        exam: &Exam,
    ) -> Result<(Vec<i64>, Vec<QuestionWithChoices>), ExamError> {
        let ids = self
            .selector
            .select_question_ids(
                self.store.as_corpus(),
                &exam.name,
                attempt.seed,
                attempt.question_count(),
            )
            .await?;
        tracing::debug!(
            attempt_id = %attempt.id,
            seed = attempt.seed,
            count = ids.len(),
            "Rebuilt attempt questions"
        );

        let questions = self.store.questions_with_choices(&ids).await?;
        Ok((ids, questions))
    }

    /// Questions for the learner, with answers and explanations withheld.
    pub async fn exam_questions(&self, attempt_id: Uuid) -> Result<Vec<PublicQuestion>, ExamError> {
        let (attempt, exam) = self.load_attempt(attempt_id).await?;
        let (_, questions) = self.attempt_questions(&attempt, &exam).await?;

        Ok(questions.into_iter().map(PublicQuestion::from).collect())
    }

    /// Grades a submission and closes the attempt. Only the first submission counts.
    pub async fn submit(
        &self,
        attempt_id: Uuid,
        submission: &ExamSubmission,
    ) -> Result<ExamResult, ExamError> {
        let (attempt, exam) = self.load_attempt(attempt_id).await?;
        if !attempt.is_open() {
            return Err(ExamError::AlreadySubmitted);
        }

        let (ids, questions) = self.attempt_questions(&attempt, &exam).await?;
        let questions = scoring::index_questions(questions);
        let submitted = scoring::normalize_submission(&questions, &submission.answers);
        let card = scoring::score_submission(&ids, &questions, &submitted)?;

        let score = i32::try_from(card.score).unwrap_or(i32::MAX);
        let closed = self
            .store
            .complete_attempt(attempt_id, score, &card.answer_rows())
            .await?;

        tracing::info!(
            attempt_id = %attempt_id,
            score = card.score,
            max_score = card.max_score,
            "Attempt submitted"
        );

        Ok(ExamResult {
            attempt_id,
            user_id: closed.user_id,
            exam_id: closed.exam_id,
            exam_name: exam.name,
            score,
            max_score: closed.max_score,
            started_at: closed.started_at,
            ended_at: closed.ended_at,
            results: card.results,
        })
    }

    /// Rebuilds the scored result of a submitted attempt.
    pub async fn result(&self, attempt_id: Uuid) -> Result<ExamResult, ExamError> {
        let (attempt, exam) = self.load_attempt(attempt_id).await?;
        let Some(score) = attempt.score else {
            return Err(ExamError::NotSubmitted);
        };
        if attempt.ended_at.is_none() {
            return Err(ExamError::NotSubmitted);
        }

        let (ids, questions) = self.attempt_questions(&attempt, &exam).await?;
        let questions = scoring::index_questions(questions);
        let answers = self.store.attempt_answers(attempt_id).await?;
        let card = scoring::reconstruct(&ids, &questions, &answers)?;

        if card.score != usize::try_from(score).unwrap_or(0) {
            tracing::warn!(
                attempt_id = %attempt_id,
                stored = score,
                rebuilt = card.score,
                "Rebuilt score differs from stored score"
            );
        }

        Ok(ExamResult {
            attempt_id,
            user_id: attempt.user_id,
            exam_id: attempt.exam_id,
            exam_name: exam.name,
            score,
            max_score: attempt.max_score,
            started_at: attempt.started_at,
            ended_at: attempt.ended_at,
            results: card.results,
        })
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<AttemptHistory>, ExamError> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(ExamError::UserNotFound);
        }

        let mut history = self.store.attempts_by_user(user_id).await?;
        for record in &mut history {
            record.question_count = record.max_score;
            record.attempt_type = attempt_type(&record.exam_name, record.max_score).to_string();
        }
        Ok(history)
    }

    /// Deletes an open attempt owned by `user_id`.
    /// A closed attempt is reported as closed whoever asks.
    pub async fn delete_attempt(&self, user_id: Uuid, attempt_id: Uuid) -> Result<(), ExamError> {
        let attempt = self
            .store
            .find_attempt(attempt_id)
            .await?
            .ok_or(ExamError::AttemptNotFound)?;

        if !attempt.is_open() {
            return Err(ExamError::AlreadyClosed);
        }
        if attempt.user_id != user_id {
            return Err(ExamError::Forbidden);
        }

        // The guarded delete loses only to a submission racing in after the check.
        if !self.store.delete_open_attempt(attempt_id, user_id).await? {
            return Err(ExamError::AlreadyClosed);
        }

        tracing::info!(attempt_id = %attempt_id, "Attempt deleted");
        Ok(())
    }

    pub async fn drill(
        &self,
        kind: DrillKind,
        requested: Option<i64>,
    ) -> Result<Vec<QuestionWithChoices>, ExamError> {
        let count = kind.clamp_count(requested);
        self.store.random_domain_questions(kind.domain(), count).await
    }
}

/// Label shown in a user's attempt history.
pub fn attempt_type(exam_name: &str, max_score: i32) -> &'static str {
    match exam_name {
        PMP_EXAM_NAME => "PMP Mock Exam",
        HARD_DRILL_EXAM_NAME => "Hard Drill",
        _ if max_score <= SHORT_QUIZ_LIMIT as i32 => "Short Quiz",
        _ => "Mock Exam",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::BlueprintTable,
        models::attempt::AnswerSubmission,
        store::memory::MemoryStore,
        test_support::{capm_corpus, question},
    };

    fn service(store: MemoryStore) -> ExamService {
        ExamService::new(
            Arc::new(store),
            QuestionSelector::new(Arc::new(BlueprintTable::standard())),
        )
    }

    fn perfect_answers(result_questions: &[QuestionWithChoices]) -> ExamSubmission {
        ExamSubmission {
            answers: result_questions
                .iter()
                .map(|q| AnswerSubmission {
                    question_id: q.question.id,
                    choice_ids: q.correct_choice_ids(),
                })
                .collect(),
        }
    }

    async fn started(service: &ExamService, kind: ExamKind) -> Attempt {
        let user = service
            .get_or_create_user("learner@example.com", "Learner")
            .await
            .unwrap();
        service.start_attempt(user.id, kind).await.unwrap()
    }

    #[tokio::test]
    async fn perfect_submission_scores_every_question() {
        let corpus = capm_corpus();
        let service = service(MemoryStore::with_questions(corpus.clone()));
        let attempt = started(&service, ExamKind::MockExam).await;

        let delivered = service.exam_questions(attempt.id).await.unwrap();
        assert_eq!(delivered.len(), 150);

        let result = service
            .submit(attempt.id, &perfect_answers(&corpus))
            .await
            .unwrap();

        assert_eq!(result.score, 150);
        assert_eq!(result.max_score, 150);
        assert!(result.results.iter().all(|r| r.is_correct));
    }

    #[tokio::test]
    async fn delivered_questions_hide_nothing_but_answers() {
        let service = service(MemoryStore::with_questions(capm_corpus()));
        let attempt = started(&service, ExamKind::MockExam).await;

        let first = service.exam_questions(attempt.id).await.unwrap();
        let second = service.exam_questions(attempt.id).await.unwrap();

        let first_ids: Vec<i64> = first.iter().map(|q| q.id).collect();
        let second_ids: Vec<i64> = second.iter().map(|q| q.id).collect();
        assert_eq!(first_ids, second_ids);
        assert!(first.iter().all(|q| !q.choices.is_empty()));
    }

    #[tokio::test]
    async fn second_submission_is_rejected_and_score_kept() {
        let corpus = capm_corpus();
        let service = service(MemoryStore::with_questions(corpus.clone()));
        let attempt = started(&service, ExamKind::MockExam).await;

        let first = service
            .submit(attempt.id, &ExamSubmission::default())
            .await
            .unwrap();
        assert_eq!(first.score, 0);

        let err = service
            .submit(attempt.id, &perfect_answers(&corpus))
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::AlreadySubmitted));

        let stored = service.result(attempt.id).await.unwrap();
        assert_eq!(stored.score, 0);
    }

    #[tokio::test]
    async fn result_matches_submission() {
        let corpus = capm_corpus();
        let service = service(MemoryStore::with_questions(corpus.clone()));
        let attempt = started(&service, ExamKind::MockExam).await;

        // Answer only the first ten corpus questions correctly.
        let submission = perfect_answers(&corpus[..10]);
        let submitted = service.submit(attempt.id, &submission).await.unwrap();
        let rebuilt = service.result(attempt.id).await.unwrap();

        assert_eq!(submitted.score, 10);
        assert_eq!(rebuilt.score, 10);
        let submitted_ids: Vec<i64> = submitted.results.iter().map(|r| r.question.question.id).collect();
        let rebuilt_ids: Vec<i64> = rebuilt.results.iter().map(|r| r.question.question.id).collect();
        assert_eq!(submitted_ids, rebuilt_ids);
        for (a, b) in submitted.results.iter().zip(&rebuilt.results) {
            assert_eq!(a.is_correct, b.is_correct);
            assert_eq!(a.user_choice_ids, b.user_choice_ids);
        }
    }

    #[tokio::test]
    async fn result_before_submission_is_rejected() {
        let service = service(MemoryStore::with_questions(capm_corpus()));
        let attempt = started(&service, ExamKind::MockExam).await;

        let err = service.result(attempt.id).await.unwrap_err();
        assert!(matches!(err, ExamError::NotSubmitted));
    }

    #[tokio::test]
    async fn closed_attempt_cannot_be_deleted_by_anyone() {
        let service = service(MemoryStore::with_questions(capm_corpus()));
        let attempt = started(&service, ExamKind::MockExam).await;
        let stranger = service
            .get_or_create_user("other@example.com", "Other")
            .await
            .unwrap();

        let err = service.delete_attempt(stranger.id, attempt.id).await.unwrap_err();
        assert!(matches!(err, ExamError::Forbidden));

        service.submit(attempt.id, &ExamSubmission::default()).await.unwrap();

        let err = service.delete_attempt(stranger.id, attempt.id).await.unwrap_err();
        assert!(matches!(err, ExamError::AlreadyClosed), "got {err:?}");
        let err = service
            .delete_attempt(attempt.user_id, attempt.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::AlreadyClosed));
    }

    #[tokio::test]
    async fn owner_can_delete_open_attempt() {
        let service = service(MemoryStore::with_questions(capm_corpus()));
        let attempt = started(&service, ExamKind::ShortQuiz).await;

        service
            .delete_attempt(attempt.user_id, attempt.id)
            .await
            .unwrap();

        let err = service.exam_questions(attempt.id).await.unwrap_err();
        assert!(matches!(err, ExamError::AttemptNotFound));
        let err = service.delete_attempt(attempt.user_id, attempt.id).await.unwrap_err();
        assert!(matches!(err, ExamError::AttemptNotFound));
    }

    #[tokio::test]
    async fn pmp_attempt_fails_on_empty_corpus_but_is_recorded() {
        let service = service(MemoryStore::with_questions(capm_corpus()));
        let attempt = started(&service, ExamKind::Pmp).await;

        let err = service.exam_questions(attempt.id).await.unwrap_err();
        assert!(matches!(err, ExamError::InsufficientQuestions { .. }));
    }

    #[tokio::test]
    async fn history_labels_attempt_types() {
        let service = service(MemoryStore::with_questions(capm_corpus()));
        let quiz = started(&service, ExamKind::ShortQuiz).await;
        started(&service, ExamKind::HardDrill).await;
        started(&service, ExamKind::MockExam).await;

        let history = service.history(quiz.user_id).await.unwrap();
        let mut labels: Vec<&str> = history.iter().map(|h| h.attempt_type.as_str()).collect();
        labels.sort();

        assert_eq!(labels, vec!["Hard Drill", "Mock Exam", "Short Quiz"]);
        assert!(history.iter().all(|h| h.question_count == h.max_score));
    }

    #[tokio::test]
    async fn drill_returns_clamped_count_from_its_domain() {
        let corpus: Vec<_> = (1..=30)
            .map(|id| question(id, "PERT Drill", 1.0, &[true, false, false, false]))
            .collect();
        let service = service(MemoryStore::with_questions(corpus));

        let questions = service.drill(DrillKind::Pert, None).await.unwrap();
        assert_eq!(questions.len(), 10);
        assert!(questions.iter().all(|q| q.question.domain == "PERT Drill"));

        let questions = service.drill(DrillKind::Pert, Some(500)).await.unwrap();
        assert_eq!(questions.len(), 30);
    }

    #[tokio::test]
    async fn history_of_unknown_user_is_not_found() {
        let service = service(MemoryStore::with_questions(capm_corpus()));

        let err = service.history(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ExamError::UserNotFound));
    }

    #[test]
    fn attempt_type_labels() {
        assert_eq!(attempt_type(PMP_EXAM_NAME, 150), "PMP Mock Exam");
        assert_eq!(attempt_type(HARD_DRILL_EXAM_NAME, 20), "Hard Drill");
        assert_eq!(attempt_type("CAPM Mock Exam", 15), "Short Quiz");
        assert_eq!(attempt_type("CAPM Mock Exam", 150), "Mock Exam");
    }
}
