// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use mock_exam::{
    engine::{BlueprintTable, QuestionSelector},
    models::question::{Choice, Question, QuestionWithChoices},
    report::TextReport,
    routes,
    services::ExamService,
    state::AppState,
    store::memory::MemoryStore,
};

fn question(id: i64, domain: &str, correct_label: usize) -> QuestionWithChoices {
    let choices = ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(idx, label)| Choice {
            id: id * 10 + idx as i64 + 1,
            question_id: id,
            label: label.to_string(),
            text: format!("Option {label}"),
            is_correct: idx == correct_label,
        })
        .collect();

    QuestionWithChoices {
        question: Question {
            id,
            prompt: format!("Scenario {id}"),
            domain: domain.to_string(),
            popularity_score: 1.0 + (id % 7) as f64,
            explanation: format!("Explanation {id}"),
            is_multi_select: false,
        },
        choices,
    }
}

/// Enough CAPM questions for a full mock exam plus one drill domain.
/// No PMP questions, so PMP attempts cannot be served.
pub fn corpus() -> Vec<QuestionWithChoices> {
    let domains = [
        ("Project Management Fundamentals", 47),
        ("Predictive Methodologies", 22),
        ("Agile Frameworks", 26),
        ("Business Analysis", 35),
        ("Hard Question", 20),
        ("PERT Drill", 12),
    ];

    let mut next_id = 1;
    let mut questions = Vec::new();
    for (domain, count) in domains {
        for n in 0..count {
            questions.push(question(next_id, domain, n % 4));
            next_id += 1;
        }
    }
    questions
}

/// Router over an in-memory store seeded with [`corpus`].
pub fn app() -> Router {
    let store = Arc::new(MemoryStore::with_questions(corpus()));
    let selector = QuestionSelector::new(Arc::new(BlueprintTable::standard()));

    let state = AppState {
        service: ExamService::new(store, selector),
        renderer: Arc::new(TextReport),
    };

    routes::create_router(state)
}

/// Spawns the app on a random port.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app() -> String {
    let app = app();

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}
