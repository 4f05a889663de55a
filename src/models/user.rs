// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::attempt::AttemptHistory;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    /// Unique email; users are looked up by it.
    pub email: String,

    pub name: String,
}

/// DTO identifying a learner (login and attempt start).
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct IdentifyRequest {
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name length must be between 1 and 255 characters."
    ))]
    pub name: String,
}

/// DTO returned by login: the user plus their attempt history.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub attempts: Vec<AttemptHistory>,
}
