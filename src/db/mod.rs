pub mod executor;
pub mod introspect;

use crate::config::DatabaseConfig;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::ConnectOptions;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum DbError {
    ConnectError(String),
    QueryError(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::ConnectError(msg) => write!(f, "Database connection error: {}", msg),
            DbError::QueryError(msg) => write!(f, "Database query error: {}", msg),
        }
    }
}

impl Error for DbError {}

/// Opens a fresh connection to the configured MySQL database.
///
/// Every introspection and execution call gets its own connection,
/// closed when dropped. There is no pool.
pub async fn open_connection(config: &DatabaseConfig) -> Result<MySqlConnection, DbError> {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    options
        .connect()
        .await
        .map_err(|e| DbError::ConnectError(e.to_string()))
}
