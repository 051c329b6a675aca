use std::sync::Arc;
use std::time::Duration;

use crate::coaching::generator::CoachingModel;
use crate::coaching::jobs::CoachingJobs;
use crate::roster::snapshot::RosterCell;
use crate::store::TabularStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Backing store for both tables. Only the recorder writes to it.
    pub store: Arc<dyn TabularStore>,
    /// Loaded roster; replaced only by an explicit reload.
    pub roster: Arc<RosterCell>,
    pub coach: Arc<dyn CoachingModel>,
    pub jobs: CoachingJobs,
    pub coaching_timeout: Duration,
}
