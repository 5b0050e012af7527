use std::sync::Arc;

use crate::config::AppConfig;
use crate::search::{IndexBackend, SearchExecutor};

/// Shared application state / 应用共享状态
pub struct AppState {
    pub config: AppConfig,
    /// Owns the single index handle; searches are serialized inside
    pub executor: Arc<SearchExecutor>,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Box<dyn IndexBackend>) -> Self {
        Self {
            config,
            executor: Arc::new(SearchExecutor::new(backend)),
        }
    }
}
