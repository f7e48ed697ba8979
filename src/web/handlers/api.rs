use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::db::executor::{execute_sql, QueryResult};
use crate::db::introspect::fetch_schema_description;
use crate::db::DbError;
use crate::llm::sanitize::clean_sql;
use crate::web::state::AppState;

#[derive(Debug, Deserialize, Clone)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub sql: String,
    pub result: QueryResult,
}

/// Error body shape shared by all failure responses; the front end reads the
/// `detail` field.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn server_error(detail: String) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { detail }))
}

/// Bundles the raw database error with the SQL that was attempted, so the
/// caller can tell a bad translation from an infrastructure problem.
fn execution_error_detail(err: &DbError, sql: &str) -> String {
    format!("Error executing SQL: {}\nGenerated query: {}", err, sql)
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
}

/// The whole pipeline for one question, in strict sequence: introspect the
/// schema fresh, prompt the model, strip any leading label, execute, respond.
/// No retry, no caching; each request re-derives everything from scratch.
pub async fn mcp_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    debug!("NL query: {}", payload.question);

    let schema_description = fetch_schema_description(&state.config.database)
        .await
        .map_err(|e| {
            error!("Schema introspection failed: {}", e);
            server_error(format!("Schema introspection failed: {}", e))
        })?;

    let raw_sql = state
        .llm_manager
        .generate_sql(&payload.question, &schema_description)
        .await
        .map_err(|e| {
            error!("LLM error: {}", e);
            server_error(format!("LLM error: {}", e))
        })?;

    let sql = clean_sql(&raw_sql);
    info!("Generated SQL: {}", sql);

    match execute_sql(&state.config.database, &sql).await {
        Ok(result) => Ok(Json(QueryResponse { sql, result })),
        Err(e) => {
            error!("SQL execution failed: {}", e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    detail: execution_error_detail(&e, &sql),
                }),
            ))
        }
    }
}

// Schema - the same description string the LLM sees, served as plain text
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    let description = fetch_schema_description(&state.config.database)
        .await
        .map_err(|e| {
            error!("Failed to get schema description: {}", e);
            server_error(format!("Schema introspection failed: {}", e))
        })?;

    Ok(description)
}

// System status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn execution_error_detail_bundles_error_and_sql() {
        let err = DbError::QueryError("Unknown column 'userz.namee' in 'field list'".to_string());
        let sql = "SELECT namee FROM userz";
        let detail = execution_error_detail(&err, sql);
        assert!(detail.contains("Unknown column 'userz.namee'"));
        assert!(detail.contains(sql));
    }

    #[test]
    fn query_response_serializes_to_the_wire_shape() {
        let response = QueryResponse {
            sql: "SELECT COUNT(*) FROM users".to_string(),
            result: QueryResult {
                columns: vec!["COUNT(*)".to_string()],
                rows: vec![vec![Value::from(3)]],
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sql"], "SELECT COUNT(*) FROM users");
        assert_eq!(json["result"]["columns"], serde_json::json!(["COUNT(*)"]));
        assert_eq!(json["result"]["rows"], serde_json::json!([[3]]));
    }

    #[test]
    fn error_body_exposes_a_detail_field() {
        let body = ErrorBody {
            detail: "Error executing SQL: boom".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("detail").is_some());
    }

    #[test]
    fn query_request_deserializes_from_the_wire_shape() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "How many users are there?"}"#).unwrap();
        assert_eq!(request.question, "How many users are there?");
    }
}
