use crate::observability::AppMetrics;
use crate::services::activity::ActivityService;
use std::sync::Arc;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Activity service (cache-aside reads and ingestion)
    pub activity_service: Arc<dyn ActivityService>,
    /// Request and cache metrics
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("activity_service", &"Arc<dyn ActivityService>")
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(activity_service: Box<dyn ActivityService>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            activity_service: Arc::from(activity_service),
            metrics,
        }
    }
}
