// src/engine/scoring.rs

use std::collections::{HashMap, HashSet};

use super::error::ExamError;
use crate::models::{
    attempt::{AnswerSubmission, AttemptAnswer, NewAttemptAnswer},
    question::QuestionWithChoices,
    result::QuestionResult,
};

/// Outcome of grading one attempt's question list.
#[derive(Debug, Clone)]
pub struct Scorecard {
    pub score: usize,
    pub max_score: usize,
    pub results: Vec<QuestionResult>,
}

impl Scorecard {
    /// One answer row per selected choice, each tagged with its question's verdict.
    pub fn answer_rows(&self) -> Vec<NewAttemptAnswer> {
        self.results
            .iter()
            .flat_map(|result| {
                result.user_choice_ids.iter().map(|choice_id| NewAttemptAnswer {
                    question_id: result.question.question.id,
                    choice_id: *choice_id,
                    is_correct: result.is_correct,
                })
            })
            .collect()
    }
}

/// Indexes corpus rows by question id.
pub fn index_questions(
    questions: Vec<QuestionWithChoices>,
) -> HashMap<i64, QuestionWithChoices> {
    questions
        .into_iter()
        .map(|q| (q.question.id, q))
        .collect()
}

/// Keeps the choices of `question` that appear in `selected`, in the
/// question's own choice order. Unknown, duplicate and non-positive ids drop out.
fn ordered_selection(question: &QuestionWithChoices, selected: &HashSet<i64>) -> Vec<i64> {
    question
        .choices
        .iter()
        .filter(|choice| choice.id > 0 && selected.contains(&choice.id))
        .map(|choice| choice.id)
        .collect()
}

/// Exact-match rule for every question type: same size, same members.
pub fn is_exact_match(selected: &[i64], correct: &[i64]) -> bool {
    if selected.is_empty() || selected.len() != correct.len() {
        return false;
    }
    let correct: HashSet<i64> = correct.iter().copied().collect();
    selected.iter().all(|id| correct.contains(id))
}

/// Groups a learner's submission by question.
///
/// Entries for questions outside the attempt, and entries that select
/// nothing valid, are dropped. A repeated question keeps its last entry.
pub fn normalize_submission(
    questions: &HashMap<i64, QuestionWithChoices>,
    answers: &[AnswerSubmission],
) -> HashMap<i64, Vec<i64>> {
    let mut by_question = HashMap::new();

    for answer in answers {
        let Some(question) = questions.get(&answer.question_id) else {
            continue;
        };

        let selected: HashSet<i64> = answer
            .choice_ids
            .iter()
            .copied()
            .filter(|id| *id > 0)
            .collect();
        if selected.is_empty() {
            continue;
        }

        let ordered = ordered_selection(question, &selected);
        if ordered.is_empty() {
            continue;
        }

        by_question.insert(answer.question_id, ordered);
    }

    by_question
}

fn lookup<'a>(
    questions: &'a HashMap<i64, QuestionWithChoices>,
    question_id: i64,
) -> Result<&'a QuestionWithChoices, ExamError> {
    questions
        .get(&question_id)
        .ok_or(ExamError::QuestionMissing(question_id))
}

/// Grades a fresh submission against the attempt's question list.
///
/// Unanswered questions are wrong and still count toward `max_score`.
pub fn score_submission(
    question_ids: &[i64],
    questions: &HashMap<i64, QuestionWithChoices>,
    submitted: &HashMap<i64, Vec<i64>>,
) -> Result<Scorecard, ExamError> {
    let mut score = 0;
    let mut results = Vec::with_capacity(question_ids.len());

    for &question_id in question_ids {
        let question = lookup(questions, question_id)?;
        let correct_ids = question.correct_choice_ids();
        let user_ids = submitted.get(&question_id).cloned().unwrap_or_default();

        let is_correct = is_exact_match(&user_ids, &correct_ids);
        if is_correct {
            score += 1;
        }

        results.push(QuestionResult {
            question: question.clone(),
            user_choice_ids: user_ids,
            correct_choice_ids: correct_ids,
            is_correct,
        });
    }

    Ok(Scorecard {
        score,
        max_score: question_ids.len(),
        results,
    })
}

/// Rebuilds the per-question results of a submitted attempt from its
/// stored answer rows.
///
/// A stored verdict wins when present; otherwise the verdict is recomputed
/// from the stored selections with the same exact-match rule.
pub fn reconstruct(
    question_ids: &[i64],
    questions: &HashMap<i64, QuestionWithChoices>,
    stored: &[AttemptAnswer],
) -> Result<Scorecard, ExamError> {
    let mut rows_by_question: HashMap<i64, Vec<&AttemptAnswer>> = HashMap::new();
    for row in stored {
        rows_by_question.entry(row.question_id).or_default().push(row);
    }

    let mut score = 0;
    let mut results = Vec::with_capacity(question_ids.len());

    for &question_id in question_ids {
        let question = lookup(questions, question_id)?;
        let correct_ids = question.correct_choice_ids();

        let rows = rows_by_question.get(&question_id).map(Vec::as_slice).unwrap_or(&[]);
        let selected: HashSet<i64> = rows.iter().filter_map(|row| row.choice_id).collect();
        let recorded = rows.iter().rev().find_map(|row| row.is_correct);
        let user_ids = ordered_selection(question, &selected);

        let is_correct = recorded.unwrap_or_else(|| is_exact_match(&user_ids, &correct_ids));
        if is_correct {
            score += 1;
        }

        results.push(QuestionResult {
            question: question.clone(),
            user_choice_ids: user_ids,
            correct_choice_ids: correct_ids,
            is_correct,
        });
    }

    Ok(Scorecard {
        score,
        max_score: question_ids.len(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::question;
    use uuid::Uuid;

    fn submission(question_id: i64, choice_ids: &[i64]) -> AnswerSubmission {
        AnswerSubmission {
            question_id,
            choice_ids: choice_ids.to_vec(),
        }
    }

    // Question 1: multi-select, choices 11..14, correct A (11) and C (13).
    // Question 2: single-select, choices 21..24, correct B (22).
    fn corpus() -> HashMap<i64, QuestionWithChoices> {
        let mut multi = question(1, "Agile Frameworks", 1.0, &[true, false, true, false]);
        multi.question.is_multi_select = true;
        let single = question(2, "Process", 1.0, &[false, true, false, false]);
        index_questions(vec![multi, single])
    }

    fn grade(answers: &[AnswerSubmission]) -> Scorecard {
        let questions = corpus();
        let submitted = normalize_submission(&questions, answers);
        score_submission(&[1, 2], &questions, &submitted).unwrap()
    }

    #[test]
    fn multi_select_requires_exact_set() {
        for wrong in [&[11][..], &[11, 13, 14], &[13]] {
            let card = grade(&[submission(1, wrong)]);
            assert!(!card.results[0].is_correct, "{wrong:?} should be wrong");
        }

        let card = grade(&[submission(1, &[13, 11])]);
        assert!(card.results[0].is_correct);
        assert_eq!(card.results[0].user_choice_ids, vec![11, 13]);
    }

    #[test]
    fn unanswered_counts_against_max_score() {
        let card = grade(&[submission(2, &[22])]);

        assert_eq!(card.score, 1);
        assert_eq!(card.max_score, 2);
        assert!(!card.results[0].is_correct);
        assert!(card.results[0].user_choice_ids.is_empty());
    }

    #[test]
    fn invalid_and_foreign_ids_are_ignored() {
        let questions = corpus();
        let submitted = normalize_submission(
            &questions,
            &[
                submission(1, &[0, -3, 11, 11, 24, 13]),
                submission(2, &[]),
                submission(99, &[22]),
            ],
        );

        assert_eq!(submitted.get(&1), Some(&vec![11, 13]));
        assert!(!submitted.contains_key(&2));
        assert!(!submitted.contains_key(&99));
    }

    #[test]
    fn repeated_question_keeps_last_entry() {
        let card = grade(&[submission(2, &[21]), submission(2, &[22])]);
        assert!(card.results[1].is_correct);
    }

    #[test]
    fn answer_rows_replicate_the_question_verdict() {
        let card = grade(&[submission(1, &[11, 14]), submission(2, &[22])]);
        let rows = card.answer_rows();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().filter(|r| r.question_id == 1).all(|r| !r.is_correct));
        assert!(rows.iter().filter(|r| r.question_id == 2).all(|r| r.is_correct));
    }

    #[test]
    fn missing_question_is_an_error() {
        let questions = corpus();
        let err = score_submission(&[1, 3], &questions, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ExamError::QuestionMissing(3)));
    }

    #[test]
    fn reconstruction_agrees_with_recorded_and_recomputed_verdicts() {
        let questions = corpus();
        let card = grade(&[submission(1, &[11, 13]), submission(2, &[23])]);
        let attempt_id = Uuid::new_v4();

        let with_verdicts: Vec<AttemptAnswer> = card
            .answer_rows()
            .into_iter()
            .map(|row| AttemptAnswer {
                id: Uuid::new_v4(),
                attempt_id,
                question_id: row.question_id,
                choice_id: Some(row.choice_id),
                is_correct: Some(row.is_correct),
            })
            .collect();
        let without_verdicts: Vec<AttemptAnswer> = with_verdicts
            .iter()
            .cloned()
            .map(|row| AttemptAnswer {
                is_correct: None,
                ..row
            })
            .collect();

        let recorded = reconstruct(&[1, 2], &questions, &with_verdicts).unwrap();
        let recomputed = reconstruct(&[1, 2], &questions, &without_verdicts).unwrap();

        assert_eq!(recorded.score, card.score);
        assert_eq!(recomputed.score, card.score);
        for (a, b) in recorded.results.iter().zip(&recomputed.results) {
            assert_eq!(a.is_correct, b.is_correct);
            assert_eq!(a.user_choice_ids, b.user_choice_ids);
        }
    }
}
