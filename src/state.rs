// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{report::ReportRenderer, services::ExamService};

#[derive(Clone)]
pub struct AppState {
    pub service: ExamService,
    pub renderer: Arc<dyn ReportRenderer>,
}

impl FromRef<AppState> for ExamService {
    fn from_ref(state: &AppState) -> Self {
        state.service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ReportRenderer> {
    fn from_ref(state: &AppState) -> Self {
        state.renderer.clone()
    }
}
