// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{IdentifyRequest, LoginResponse},
    services::ExamService,
};

/// Identifies a learner by email, creating the user on first sight.
/// Returns the user together with their attempt history.
pub async fn login(
    State(service): State<ExamService>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = service
        .get_or_create_user(&payload.email, &payload.name)
        .await?;
    let attempts = service.history(user.id).await?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        name: user.name,
        email: user.email,
        attempts,
    }))
}

/// Lists a user's attempts, newest first.
pub async fn list_attempts(
    State(service): State<ExamService>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = service.history(user_id).await?;
    Ok(Json(history))
}
