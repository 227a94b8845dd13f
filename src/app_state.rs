use crate::config::Config;
use crate::service::TaskService;
use std::sync::Arc;

/// Built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub task_service: Arc<dyn TaskService>,
    pub config: Config,
}

impl AppState {
    pub fn new(task_service: Arc<dyn TaskService>, config: Config) -> Self {
        Self {
            task_service,
            config,
        }
    }
}
