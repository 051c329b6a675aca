use axum::{
    extract::State,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::extract::AppPath;
use crate::models::interview::{InterviewRecord, InterviewType};
use crate::models::profile::EmployeeProfile;
use crate::roster::index::LookupError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct TeamResponse {
    pub manager_id: String,
    pub employees: Vec<EmployeeProfile>,
}

#[derive(Serialize)]
pub struct EmployeeDetailResponse {
    pub profile: EmployeeProfile,
    pub interview_count: usize,
    /// Interviews this manager conducted, newest first.
    pub history: Vec<InterviewRecord>,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub profiles: usize,
    pub interviews: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct InterviewTypeEntry {
    pub id: &'static str,
    pub label: &'static str,
}

/// Trims a path identifier and rejects blank input.
pub(crate) fn require_id(field: &str, raw: &str) -> Result<String, AppError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(id.to_string())
}

/// GET /api/v1/managers/:manager_id/employees
pub async fn handle_team(
    State(state): State<AppState>,
    AppPath(manager_id): AppPath<String>,
) -> Result<Json<TeamResponse>, AppError> {
    let manager_id = require_id("manager_id", &manager_id)?;
    let snapshot = state.roster.current().await?;

    let employees: Vec<EmployeeProfile> =
        snapshot.team(&manager_id).into_iter().cloned().collect();
    if employees.is_empty() {
        return Err(LookupError::NoTeam { manager_id }.into());
    }

    Ok(Json(TeamResponse {
        manager_id,
        employees,
    }))
}

/// GET /api/v1/managers/:manager_id/employees/:emp_id
pub async fn handle_employee(
    State(state): State<AppState>,
    AppPath((manager_id, emp_id)): AppPath<(String, String)>,
) -> Result<Json<EmployeeDetailResponse>, AppError> {
    let manager_id = require_id("manager_id", &manager_id)?;
    let emp_id = require_id("emp_id", &emp_id)?;
    let snapshot = state.roster.current().await?;

    let view = snapshot.employee(&manager_id, &emp_id)?;
    Ok(Json(EmployeeDetailResponse {
        profile: view.profile.clone(),
        interview_count: view.history.len(),
        history: view.history.all().iter().map(|r| (*r).clone()).collect(),
    }))
}

/// POST /api/v1/roster/reload
pub async fn handle_reload(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let snapshot = state.roster.reload(state.store.as_ref()).await?;
    Ok(Json(ReloadResponse {
        profiles: snapshot.profiles.profiles.len(),
        interviews: snapshot.interviews.records.len(),
        loaded_at: snapshot.loaded_at,
    }))
}

/// GET /api/v1/interview-types
pub async fn handle_interview_types() -> Json<Vec<InterviewTypeEntry>> {
    Json(
        InterviewType::ALL
            .iter()
            .map(|t| InterviewTypeEntry {
                id: t.as_str(),
                label: t.label(),
            })
            .collect(),
    )
}
