use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::coaching::generator::generate_coaching;
use crate::coaching::jobs::CoachingJob;
use crate::coaching::synthesizer::{synthesize, CoachingRequest};
use crate::errors::AppError;
use crate::extract::AppPath;
use crate::roster::handlers::require_id;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PromptPreviewResponse {
    pub system: &'static str,
    pub prompt: String,
    #[serde(flatten)]
    pub request: CoachingRequest,
}

#[derive(Serialize)]
pub struct CoachingResponse {
    pub emp_id: String,
    pub manager_id: String,
    pub coaching_text: String,
}

/// Looks the employee up in the current snapshot and synthesizes the request.
async fn build_request(
    state: &AppState,
    manager_id: &str,
    emp_id: &str,
) -> Result<CoachingRequest, AppError> {
    let snapshot = state.roster.current().await?;
    let view = snapshot.employee(manager_id, emp_id)?;
    if view.history.is_empty() {
        info!(
            "No interviews on record for employee {emp_id} (manager {manager_id}); \
             coaching from profile only"
        );
    }
    Ok(synthesize(view.profile, &view.history))
}

/// GET /api/v1/managers/:manager_id/employees/:emp_id/coaching/prompt
pub async fn handle_prompt_preview(
    State(state): State<AppState>,
    AppPath((manager_id, emp_id)): AppPath<(String, String)>,
) -> Result<Json<PromptPreviewResponse>, AppError> {
    let manager_id = require_id("manager_id", &manager_id)?;
    let emp_id = require_id("emp_id", &emp_id)?;
    let request = build_request(&state, &manager_id, &emp_id).await?;

    Ok(Json(PromptPreviewResponse {
        system: request.system(),
        prompt: request.render(),
        request,
    }))
}

/// POST /api/v1/managers/:manager_id/employees/:emp_id/coaching
pub async fn handle_generate(
    State(state): State<AppState>,
    AppPath((manager_id, emp_id)): AppPath<(String, String)>,
) -> Result<Json<CoachingResponse>, AppError> {
    let manager_id = require_id("manager_id", &manager_id)?;
    let emp_id = require_id("emp_id", &emp_id)?;
    let request = build_request(&state, &manager_id, &emp_id).await?;

    let coaching_text =
        generate_coaching(state.coach.as_ref(), &request, state.coaching_timeout).await?;

    Ok(Json(CoachingResponse {
        emp_id,
        manager_id,
        coaching_text,
    }))
}

/// POST /api/v1/managers/:manager_id/employees/:emp_id/coaching/jobs
pub async fn handle_start_job(
    State(state): State<AppState>,
    AppPath((manager_id, emp_id)): AppPath<(String, String)>,
) -> Result<(StatusCode, Json<CoachingJob>), AppError> {
    let manager_id = require_id("manager_id", &manager_id)?;
    let emp_id = require_id("emp_id", &emp_id)?;
    let request = build_request(&state, &manager_id, &emp_id).await?;

    let job = state
        .jobs
        .start(
            state.coach.clone(),
            request,
            state.coaching_timeout,
            &emp_id,
            &manager_id,
        )
        .await;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /api/v1/coaching/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<Json<CoachingJob>, AppError> {
    state
        .jobs
        .get(job_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Coaching job {job_id} not found")))
}

/// DELETE /api/v1/coaching/jobs/:job_id
pub async fn handle_cancel_job(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<Json<CoachingJob>, AppError> {
    state
        .jobs
        .cancel(job_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Coaching job {job_id} not found")))
}
