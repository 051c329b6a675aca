pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::coaching::handlers as coaching;
use crate::interviews::handlers as interviews;
use crate::roster::handlers as roster;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Roster
        .route(
            "/api/v1/managers/:manager_id/employees",
            get(roster::handle_team),
        )
        .route(
            "/api/v1/managers/:manager_id/employees/:emp_id",
            get(roster::handle_employee),
        )
        .route("/api/v1/roster/reload", post(roster::handle_reload))
        .route(
            "/api/v1/interview-types",
            get(roster::handle_interview_types),
        )
        // Coaching
        .route(
            "/api/v1/managers/:manager_id/employees/:emp_id/coaching/prompt",
            get(coaching::handle_prompt_preview),
        )
        .route(
            "/api/v1/managers/:manager_id/employees/:emp_id/coaching",
            post(coaching::handle_generate),
        )
        .route(
            "/api/v1/managers/:manager_id/employees/:emp_id/coaching/jobs",
            post(coaching::handle_start_job),
        )
        .route(
            "/api/v1/coaching/jobs/:job_id",
            get(coaching::handle_get_job).delete(coaching::handle_cancel_job),
        )
        // Interviews
        .route(
            "/api/v1/managers/:manager_id/employees/:emp_id/interviews",
            post(interviews::handle_save_interview),
        )
        .with_state(state)
}
