// src/handlers/exam.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attempt::{DeleteAttemptRequest, ExamSubmission, StartAttemptResponse},
        exam::ExamKind,
        user::IdentifyRequest,
    },
    report::ReportRenderer,
    services::ExamService,
};

/// Shared body of the start endpoints: identify the learner, then open an attempt.
async fn start(
    service: &ExamService,
    payload: IdentifyRequest,
    kind: ExamKind,
) -> Result<(StatusCode, Json<StartAttemptResponse>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = service
        .get_or_create_user(&payload.email, &payload.name)
        .await?;
    let attempt = service.start_attempt(user.id, kind).await?;

    Ok((
        StatusCode::CREATED,
        Json(StartAttemptResponse {
            attempt_id: attempt.id,
            user_id: user.id,
            started_at: attempt.started_at,
            question_count: attempt.max_score,
        }),
    ))
}

/// Starts a 150-question CAPM mock exam.
pub async fn start_mock_exam(
    State(service): State<ExamService>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    start(&service, payload, ExamKind::MockExam).await
}

/// Starts a 15-question CAPM quiz.
pub async fn start_short_quiz(
    State(service): State<ExamService>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    start(&service, payload, ExamKind::ShortQuiz).await
}

pub async fn start_pmp_exam(
    State(service): State<ExamService>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    start(&service, payload, ExamKind::Pmp).await
}

pub async fn start_hard_drill(
    State(service): State<ExamService>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    start(&service, payload, ExamKind::HardDrill).await
}

/// Questions of an attempt in presentation order, answers withheld.
pub async fn get_questions(
    State(service): State<ExamService>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let questions = service.exam_questions(attempt_id).await?;
    Ok(Json(questions))
}

/// Grades and closes an attempt. A second submission gets 409.
pub async fn submit(
    State(service): State<ExamService>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<ExamSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let result = service.submit(attempt_id, &payload).await?;
    Ok(Json(result))
}

pub async fn get_results(
    State(service): State<ExamService>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = service.result(attempt_id).await?;
    Ok(Json(result))
}

/// Downloads the rendered report of a submitted attempt.
pub async fn download_report(
    State(service): State<ExamService>,
    State(renderer): State<Arc<dyn ReportRenderer>>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = service.result(attempt_id).await?;
    let body = renderer.render(&result);
    let disposition = format!("attachment; filename=\"{}\"", renderer.file_name(&result));

    Ok((
        [
            (header::CONTENT_TYPE, renderer.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Deletes an attempt that is still open. Only its owner may do this.
pub async fn delete_attempt(
    State(service): State<ExamService>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<DeleteAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    service.delete_attempt(payload.user_id, attempt_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
