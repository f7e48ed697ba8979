use crate::config::DatabaseConfig;
use crate::db::{open_connection, DbError};
use sqlx::{Connection, Row};
use tracing::debug;

/// One column of a table as reported by `SHOW FULL COLUMNS`.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// A foreign-key edge from `information_schema.KEY_COLUMN_USAGE`.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// Snapshot of the database structure at request time. Never cached.
#[derive(Debug, Clone)]
pub struct DatabaseSchema {
    pub tables: Vec<TableInfo>,
    pub relations: Vec<ForeignKey>,
}

impl DatabaseSchema {
    /// Renders the schema as the human-readable description handed to the LLM.
    ///
    /// Tables and columns keep the order the database returned them in, with
    /// relation lines appended after all table listings.
    pub fn describe(&self) -> String {
        let mut text = String::from("Database schema:\n");
        for table in &self.tables {
            let columns = table
                .columns
                .iter()
                .map(|c| {
                    if c.comment.is_empty() {
                        format!("`{}` ({})", c.name, c.data_type)
                    } else {
                        format!("`{}` ({}: {})", c.name, c.data_type, c.comment)
                    }
                })
                .collect::<Vec<String>>()
                .join(", ");
            text.push_str(&format!("- Table `{}` with columns: {}.\n", table.name, columns));
        }
        if !self.relations.is_empty() {
            text.push_str("Relations:\n");
            for fk in &self.relations {
                text.push_str(&format!(
                    "- `{}`.`{}` references `{}`.`{}`.\n",
                    fk.table, fk.column, fk.referenced_table, fk.referenced_column
                ));
            }
        }
        text
    }
}

/// Introspects the configured database over a fresh connection.
///
/// Any connectivity or query failure is fatal for the request; there is no
/// retry and no fallback schema.
pub async fn fetch_schema(config: &DatabaseConfig) -> Result<DatabaseSchema, DbError> {
    let mut conn = open_connection(config).await?;

    // Tables and their columns
    let table_rows = sqlx::query("SHOW TABLES")
        .fetch_all(&mut conn)
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

    let table_names: Vec<String> = table_rows
        .iter()
        .map(|row| row.try_get::<String, _>(0))
        .collect::<Result<_, _>>()
        .map_err(|e| DbError::QueryError(e.to_string()))?;

    let mut tables = Vec::with_capacity(table_names.len());
    for name in table_names {
        let column_rows = sqlx::query(&format!("SHOW FULL COLUMNS FROM `{}`", name))
            .fetch_all(&mut conn)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            // SHOW FULL COLUMNS layout: Field, Type, Collation, Null, Key,
            // Default, Extra, Privileges, Comment
            let column_name: String = row
                .try_get(0)
                .map_err(|e| DbError::QueryError(e.to_string()))?;
            let data_type: String = row
                .try_get(1)
                .map_err(|e| DbError::QueryError(e.to_string()))?;
            let comment: Option<String> = row
                .try_get(8)
                .map_err(|e| DbError::QueryError(e.to_string()))?;
            columns.push(ColumnInfo {
                name: column_name,
                data_type,
                comment: comment.unwrap_or_default(),
            });
        }

        tables.push(TableInfo { name, columns });
    }

    // Foreign keys scoped to the configured database
    let fk_rows = sqlx::query(
        "SELECT TABLE_NAME, COLUMN_NAME, REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME \
         FROM information_schema.KEY_COLUMN_USAGE \
         WHERE TABLE_SCHEMA = ? AND REFERENCED_TABLE_NAME IS NOT NULL",
    )
    .bind(&config.database)
    .fetch_all(&mut conn)
    .await
    .map_err(|e| DbError::QueryError(e.to_string()))?;

    let mut relations = Vec::with_capacity(fk_rows.len());
    for row in &fk_rows {
        relations.push(ForeignKey {
            table: row
                .try_get(0)
                .map_err(|e| DbError::QueryError(e.to_string()))?,
            column: row
                .try_get(1)
                .map_err(|e| DbError::QueryError(e.to_string()))?,
            referenced_table: row
                .try_get(2)
                .map_err(|e| DbError::QueryError(e.to_string()))?,
            referenced_column: row
                .try_get(3)
                .map_err(|e| DbError::QueryError(e.to_string()))?,
        });
    }

    conn.close().await.ok();

    debug!(
        "Introspected {} tables and {} relations from `{}`",
        tables.len(),
        relations.len(),
        config.database
    );

    Ok(DatabaseSchema { tables, relations })
}

/// Convenience wrapper used by the request handler: introspect and render.
pub async fn fetch_schema_description(config: &DatabaseConfig) -> Result<String, DbError> {
    Ok(fetch_schema(config).await?.describe())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> DatabaseSchema {
        DatabaseSchema {
            tables: vec![
                TableInfo {
                    name: "users".to_string(),
                    columns: vec![
                        ColumnInfo {
                            name: "id".to_string(),
                            data_type: "int".to_string(),
                            comment: String::new(),
                        },
                        ColumnInfo {
                            name: "name".to_string(),
                            data_type: "varchar(100)".to_string(),
                            comment: "full user name".to_string(),
                        },
                    ],
                },
                TableInfo {
                    name: "orders".to_string(),
                    columns: vec![
                        ColumnInfo {
                            name: "id".to_string(),
                            data_type: "int".to_string(),
                            comment: String::new(),
                        },
                        ColumnInfo {
                            name: "user_id".to_string(),
                            data_type: "int".to_string(),
                            comment: String::new(),
                        },
                    ],
                },
            ],
            relations: vec![ForeignKey {
                table: "orders".to_string(),
                column: "user_id".to_string(),
                referenced_table: "users".to_string(),
                referenced_column: "id".to_string(),
            }],
        }
    }

    #[test]
    fn describe_lists_tables_in_database_order() {
        let text = sample_schema().describe();
        let users_pos = text.find("Table `users`").unwrap();
        let orders_pos = text.find("Table `orders`").unwrap();
        assert!(users_pos < orders_pos);
        assert!(text.contains("- Table `users` with columns: `id` (int), `name` (varchar(100): full user name)."));
    }

    #[test]
    fn describe_appends_relations_after_tables() {
        let text = sample_schema().describe();
        let relations_pos = text.find("Relations:").unwrap();
        let orders_pos = text.find("Table `orders`").unwrap();
        assert!(relations_pos > orders_pos);
        assert!(text.contains("- `orders`.`user_id` references `users`.`id`."));
    }

    #[test]
    fn describe_omits_relations_section_when_there_are_none() {
        let mut schema = sample_schema();
        schema.relations.clear();
        let text = schema.describe();
        assert!(!text.contains("Relations:"));
    }

    #[test]
    fn describe_is_deterministic() {
        let schema = sample_schema();
        assert_eq!(schema.describe(), schema.describe());
    }
}
