// src/handlers/drill.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::exam::{DrillKind, DrillQuery},
    services::ExamService,
};

/// Random practice questions from one drill domain.
///
/// Answers and explanations are included; drills are self-checked on the
/// client and never stored.
pub async fn drill_questions(
    State(service): State<ExamService>,
    Path(kind): Path<DrillKind>,
    Query(params): Query<DrillQuery>,
) -> Result<impl IntoResponse, AppError> {
    let questions = service.drill(kind, params.count).await?;
    Ok(Json(questions))
}
