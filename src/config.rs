// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Questions in a full CAPM or PMP mock exam.
pub const FULL_EXAM_QUESTION_COUNT: usize = 150;
/// Questions in the short CAPM quiz.
pub const SHORT_QUIZ_QUESTION_COUNT: usize = 15;
/// Questions in the hard-question drill.
pub const HARD_DRILL_QUESTION_COUNT: usize = 20;
/// Score percentage at or above which a report shows PASS.
pub const PASSING_SCORE_PERCENTAGE: f64 = 70.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub log_dir: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let bind_address = env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            bind_address,
            log_dir,
            rust_log,
        }
    }
}
