use crate::config::DatabaseConfig;
use crate::db::{open_connection, DbError};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo};
use tracing::debug;

/// Column names and row values produced by executing one statement.
/// Both sequences are empty for statements without a result set.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Executes a single SQL statement over a fresh connection.
///
/// Invalid SQL surfaces as a `DbError` for the caller to report; a statement
/// that produces no result set (DDL, DML) yields empty columns and rows.
pub async fn execute_sql(config: &DatabaseConfig, sql: &str) -> Result<QueryResult, DbError> {
    let mut conn = open_connection(config).await?;

    let raw_rows = sqlx::query(sql)
        .fetch_all(&mut conn)
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

    let columns: Vec<String> = if let Some(first) = raw_rows.first() {
        first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    } else {
        // Zero-row SELECTs still report their column names; statements that
        // cannot be described (or return nothing) report none.
        match (&mut conn).prepare(sql).await {
            Ok(stmt) => stmt
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    };

    let rows: Vec<Vec<Value>> = raw_rows
        .iter()
        .map(|row| (0..row.len()).map(|i| cell_to_json(row, i)).collect())
        .collect();

    conn.close().await.ok();

    debug!("Executed statement: {} columns, {} rows", columns.len(), rows.len());

    Ok(QueryResult { columns, rows })
}

/// Best-effort decoding of one cell into a JSON value, keyed off the MySQL
/// column type. Values that fail to decode become null rather than aborting
/// the whole result set.
fn cell_to_json(row: &MySqlRow, idx: usize) -> Value {
    let type_name = row.column(idx).type_info().name();

    match type_name {
        "NULL" => Value::Null,
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(idx)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" | "BIT" => row
            .try_get::<Option<u64>, _>(idx)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(idx)
            .ok()
            .flatten()
            .map(float_to_json)
            .unwrap_or(Value::Null),
        "DOUBLE" => row
            .try_get::<Option<f64>, _>(idx)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),
        // MySQL reports DECIMAL for SUM()/AVG() over integer columns, so this
        // arm carries most aggregate results.
        "DECIMAL" => row
            .try_get::<Option<Decimal>, _>(idx)
            .ok()
            .flatten()
            .map(decimal_to_json)
            .unwrap_or(Value::Null),
        "JSON" => row
            .try_get::<Option<Value>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(Value::Null),
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        "TIME" => row
            .try_get::<Option<chrono::NaiveTime>, _>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        "DATETIME" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_rfc3339()))
            .unwrap_or(Value::Null),
        // CHAR/VARCHAR/TEXT/ENUM/SET and anything else: try text, then raw
        // bytes, then give up.
        _ => {
            if let Ok(Some(text)) = row.try_get::<Option<String>, _>(idx) {
                Value::String(text)
            } else if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            } else {
                Value::Null
            }
        }
    }
}

/// Renders a DECIMAL as a JSON number, falling back to its decimal string
/// when the value does not parse as one.
fn decimal_to_json(value: Decimal) -> Value {
    value
        .to_string()
        .parse::<serde_json::Number>()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(value.to_string()))
}

/// Widens an f32 through its shortest decimal form, so a stored 0.1 stays
/// 0.1 instead of picking up the raw-cast noise digits.
fn float_to_json(value: f32) -> Value {
    value
        .to_string()
        .parse::<f64>()
        .map(Value::from)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_serializes_with_both_sequences() {
        let result = QueryResult {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["columns"], serde_json::json!(["id", "name"]));
        assert_eq!(json["rows"], serde_json::json!([]));
    }

    #[test]
    fn decimal_cells_become_json_numbers() {
        // AVG(price) and SUM(quantity) both come back as DECIMAL
        assert_eq!(decimal_to_json(Decimal::new(25, 1)), serde_json::json!(2.5));
        assert_eq!(
            decimal_to_json("124.50".parse().unwrap()),
            serde_json::json!(124.5)
        );
        assert_eq!(decimal_to_json(Decimal::new(42, 0)), serde_json::json!(42));
    }

    #[test]
    fn float_cells_keep_their_shortest_decimal_form() {
        assert_eq!(float_to_json(0.1_f32), serde_json::json!(0.1));
        assert_eq!(float_to_json(2.5_f32), serde_json::json!(2.5));
        assert_eq!(float_to_json(f32::NAN), Value::Null);
    }

    #[test]
    fn single_cell_result_serializes_as_nested_arrays() {
        let result = QueryResult {
            columns: vec!["COUNT(*)".to_string()],
            rows: vec![vec![Value::from(42)]],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rows"], serde_json::json!([[42]]));
    }
}
