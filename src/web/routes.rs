use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - the NL-to-SQL pipeline plus operator endpoints
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mcp/query", post(handlers::api::mcp_query))
        .nest(
            "/api",
            Router::new()
                .route("/schema", get(handlers::api::get_schema))
                .route("/status", get(handlers::api::system_status)),
        )
}
