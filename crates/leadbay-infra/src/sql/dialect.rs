//! Engine dialect strategy.
//!
//! Exactly three axes vary between the supported engines: placeholder
//! style, insert-result retrieval, and pagination operand order. All
//! statements are written against neutral `?` placeholders; the dialect
//! renders them into engine text at execution time. SQLite rides the
//! MySQL placeholder and last-insert-id path and exists for development
//! and the test suite.

use leadbay_types::error::StoreError;

/// SQL rendering rules for one engine, selected once at startup from the
/// connection URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Derive the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        let scheme = url.split("://").next().unwrap_or("");
        match scheme {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(StoreError::Configuration(format!(
                "unsupported database URL scheme '{other}'"
            ))),
        }
    }

    /// Whether the engine returns inserted rows directly via
    /// `INSERT ... RETURNING`. Engines without it use the
    /// connection-scoped last-insert-id fetch instead.
    pub fn supports_returning(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Render neutral `?` placeholders into engine syntax. Postgres uses
    /// sequential numbered placeholders; the others keep ordinal `?`.
    pub fn render(&self, sql: &str) -> String {
        match self {
            Dialect::Postgres => {
                let mut out = String::with_capacity(sql.len() + 8);
                let mut n = 0;
                for ch in sql.chars() {
                    if ch == '?' {
                        n += 1;
                        out.push('$');
                        out.push_str(&n.to_string());
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            Dialect::MySql | Dialect::Sqlite => sql.to_string(),
        }
    }

    /// Render a pagination clause. The operands are already clamped
    /// integers, so they are rendered as literals rather than bound.
    pub fn paginate(&self, limit: i64, offset: i64) -> String {
        match self {
            Dialect::MySql => format!("LIMIT {offset}, {limit}"),
            Dialect::Postgres | Dialect::Sqlite => format!("LIMIT {limit} OFFSET {offset}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(
            Dialect::from_url("postgres://u:p@h/db").unwrap(),
            Dialect::Postgres
        );
        assert_eq!(
            Dialect::from_url("postgresql://u:p@h/db").unwrap(),
            Dialect::Postgres
        );
        assert_eq!(Dialect::from_url("mysql://u:p@h/db").unwrap(), Dialect::MySql);
        assert_eq!(
            Dialect::from_url("sqlite:///tmp/x.db").unwrap(),
            Dialect::Sqlite
        );
        assert!(matches!(
            Dialect::from_url("mongodb://h/db"),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_postgres_numbers_placeholders_sequentially() {
        let sql = "INSERT INTO leads (a, b, c) VALUES (?, ?, ?)";
        assert_eq!(
            Dialect::Postgres.render(sql),
            "INSERT INTO leads (a, b, c) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_ordinal_dialects_keep_placeholders() {
        let sql = "SELECT * FROM leads WHERE microsite = ? AND status = ?";
        assert_eq!(Dialect::MySql.render(sql), sql);
        assert_eq!(Dialect::Sqlite.render(sql), sql);
    }

    #[test]
    fn test_paginate_operand_order() {
        assert_eq!(Dialect::Postgres.paginate(50, 10), "LIMIT 50 OFFSET 10");
        assert_eq!(Dialect::Sqlite.paginate(50, 10), "LIMIT 50 OFFSET 10");
        assert_eq!(Dialect::MySql.paginate(50, 10), "LIMIT 10, 50");
    }

    #[test]
    fn test_only_postgres_supports_returning() {
        assert!(Dialect::Postgres.supports_returning());
        assert!(!Dialect::MySql.supports_returning());
        assert!(!Dialect::Sqlite.supports_returning());
    }
}
