use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::interviews::recorder::{record_interview, InterviewDraft};
use crate::models::interview::{InterviewRecord, InterviewType};
use crate::roster::handlers::require_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveInterviewRequest {
    #[serde(default)]
    pub interview_type: String,
    #[serde(default)]
    pub summary_text: String,
}

/// POST /api/v1/managers/:manager_id/employees/:emp_id/interviews
///
/// The saved record shows up in history only after the next roster reload.
pub async fn handle_save_interview(
    State(state): State<AppState>,
    AppPath((manager_id, emp_id)): AppPath<(String, String)>,
    AppJson(req): AppJson<SaveInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRecord>), AppError> {
    let manager_id = require_id("manager_id", &manager_id)?;
    let emp_id = require_id("emp_id", &emp_id)?;

    // Only the manager's own team can be written for.
    let snapshot = state.roster.current().await?;
    snapshot.employee(&manager_id, &emp_id)?;

    let interview_type = InterviewType::parse(&req.interview_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown interview_type '{}'; expected one of {}",
            req.interview_type,
            InterviewType::ALL
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    let draft = InterviewDraft {
        emp_id,
        manager_id,
        interview_type,
        summary_text: req.summary_text,
    };
    let today = chrono::Local::now().date_naive();
    let record = record_interview(state.store.as_ref(), draft, today).await?;

    Ok((StatusCode::CREATED, Json(record)))
}
