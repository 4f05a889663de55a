// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{drill, exam, users},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (users, attempt starts, exams, attempts, drills).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (exam service, report renderer, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let user_routes = Router::new()
        .route("/login", post(users::login))
        .route("/{user_id}/attempts", get(users::list_attempts));

    let exam_routes = Router::new()
        .route("/start", post(exam::start_mock_exam))
        .route("/{attempt_id}/questions", get(exam::get_questions))
        .route("/{attempt_id}/submit", post(exam::submit))
        .route("/{attempt_id}/results", get(exam::get_results))
        .route("/{attempt_id}/report", get(exam::download_report));

    let api = Router::new()
        .nest("/users", user_routes)
        .nest("/exams", exam_routes)
        .route("/quiz/start", post(exam::start_short_quiz))
        .route("/pmp/start", post(exam::start_pmp_exam))
        .route("/hard/start", post(exam::start_hard_drill))
        .route("/attempts/{attempt_id}", delete(exam::delete_attempt))
        .route("/drills/{kind}/questions", get(drill::drill_questions));

    Router::new()
        .nest("/api", api)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
