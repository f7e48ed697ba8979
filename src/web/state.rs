use crate::config::AppConfig;
use crate::llm::LlmManager;

/// Shared application state for the web server.
///
/// Deliberately thin: no connection pool and no schema cache. Every request
/// opens its own database connections and re-derives the schema, so
/// concurrent requests share nothing mutable.
pub struct AppState {
    pub config: AppConfig,
    pub llm_manager: LlmManager,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, llm_manager: LlmManager) -> Self {
        Self {
            config,
            llm_manager,
            startup_time: chrono::Utc::now(),
        }
    }
}
