//! Schema bootstrapper.
//!
//! Reads the canonical schema for the active dialect, splits it into
//! individual statements, and executes them sequentially. Safe to run on
//! every process start: duplicate-definition errors are logged and
//! skipped (MySQL index creation reruns land here), anything else aborts
//! the bootstrap.

use leadbay_types::error::StoreError;

use super::dialect::Dialect;
use super::pool::Database;

const POSTGRES_SCHEMA: &str = include_str!("../../schema/postgres.sql");
const MYSQL_SCHEMA: &str = include_str!("../../schema/mysql.sql");
const SQLITE_SCHEMA: &str = include_str!("../../schema/sqlite.sql");

/// Apply the persisted-state layout idempotently.
pub async fn initialize_schema(db: &Database) -> Result<(), StoreError> {
    let text = match db.dialect() {
        Dialect::Postgres => POSTGRES_SCHEMA,
        Dialect::MySql => MYSQL_SCHEMA,
        Dialect::Sqlite => SQLITE_SCHEMA,
    };

    for statement in split_statements(text) {
        match db.execute_raw(&statement).await {
            Ok(()) => {}
            Err(StoreError::Query(msg)) if is_already_exists(&msg) => {
                tracing::debug!(statement = %first_line(&statement), "schema object already exists, skipping");
            }
            Err(e) => {
                tracing::error!(statement = %first_line(&statement), error = %e, "schema bootstrap failed");
                return Err(StoreError::Schema(e.to_string()));
            }
        }
    }

    tracing::info!("schema bootstrap complete");
    Ok(())
}

/// Split schema text into executable statements, stripping `--` comments
/// and blank segments.
pub fn split_statements(text: &str) -> Vec<String> {
    let stripped: String = text
        .lines()
        .map(|line| match line.find("--") {
            Some(pos) => &line[..pos],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    stripped
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Duplicate-definition class of errors across the three engines:
/// Postgres 42P07, MySQL 1050/1061, SQLite "already exists".
pub fn is_already_exists(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("already exists")
        || lower.contains("duplicate key name")
        || lower.contains("duplicate column")
        || lower.contains("42p07")
        || lower.contains("1050")
        || lower.contains("1061")
}

fn first_line(statement: &str) -> &str {
    statement.lines().next().unwrap_or(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_strips_comments_and_blanks() {
        let text = "-- header\nCREATE TABLE a (x INT);\n\n-- noise\nCREATE INDEX i ON a(x);\n";
        let statements = split_statements(text);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "CREATE TABLE a (x INT)");
        assert_eq!(statements[1], "CREATE INDEX i ON a(x)");
    }

    #[test]
    fn test_split_handles_trailing_comment_on_statement_line() {
        let statements = split_statements("CREATE TABLE a (x INT); -- trailing");
        assert_eq!(statements, vec!["CREATE TABLE a (x INT)".to_string()]);
    }

    #[test]
    fn test_already_exists_detection() {
        assert!(is_already_exists("table \"leads\" already exists"));
        assert!(is_already_exists("Duplicate key name 'idx_leads_phone'"));
        assert!(is_already_exists("error returned from database: 1061"));
        assert!(!is_already_exists("syntax error at or near SELECT"));
    }

    #[test]
    fn test_canonical_schemas_split_cleanly() {
        for text in [POSTGRES_SCHEMA, MYSQL_SCHEMA, SQLITE_SCHEMA] {
            let statements = split_statements(text);
            assert!(statements.len() > 10);
            for s in &statements {
                assert!(s.starts_with("CREATE"), "unexpected statement: {s}");
            }
        }
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent_on_sqlite() {
        use crate::sql::testing::sqlite_config;
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("s.db").display());
        let db = Database::connect(&sqlite_config(url)).await.unwrap();

        initialize_schema(&db).await.unwrap();
        // Second run must be a no-op, not an error.
        initialize_schema(&db).await.unwrap();

        let row = db
            .fetch_optional(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'leads'",
                &[],
            )
            .await
            .unwrap();
        assert!(row.is_some());
    }
}
