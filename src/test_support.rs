// src/test_support.rs

use crate::models::question::{Choice, Question, QuestionWithChoices};

const LABELS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Builds a question whose choice ids are `id * 10 + 1`, `id * 10 + 2`, ...
/// `correct` flags each choice in label order.
pub fn question(id: i64, domain: &str, weight: f64, correct: &[bool]) -> QuestionWithChoices {
    let choices = correct
        .iter()
        .enumerate()
        .map(|(idx, is_correct)| Choice {
            id: id * 10 + idx as i64 + 1,
            question_id: id,
            label: LABELS[idx].to_string(),
            text: format!("Option {} for question {}", LABELS[idx], id),
            is_correct: *is_correct,
        })
        .collect();

    QuestionWithChoices {
        question: Question {
            id,
            prompt: format!("Scenario {id} in {domain}"),
            domain: domain.to_string(),
            popularity_score: weight,
            explanation: format!("Why question {id} resolves the way it does."),
            is_multi_select: correct.iter().filter(|c| **c).count() > 1,
        },
        choices,
    }
}

/// Exactly enough questions for the full CAPM blueprint: 47/22/26/35 plus 20 hard.
pub fn capm_corpus() -> Vec<QuestionWithChoices> {
    let domains = [
        ("Project Management Fundamentals", 47),
        ("Predictive Methodologies", 22),
        ("Agile Frameworks", 26),
        ("Business Analysis", 35),
        ("Hard Question", 20),
    ];

    let mut next_id = 1;
    let mut corpus = Vec::new();
    for (domain, count) in domains {
        for n in 0..count {
            let weight = 0.5 + (n % 5) as f64 / 10.0;
            let correct: &[bool] = if n % 4 == 0 {
                &[true, false, true, false]
            } else {
                &[false, true, false, false]
            };
            corpus.push(question(next_id, domain, weight, correct));
            next_id += 1;
        }
    }
    corpus
}
