//! Connection manager.
//!
//! One [`Database`] per process, owned by the composition root and
//! passed by clone into every store. Explicit `connect`/`close`
//! lifecycle, bounded pool, and a startup `ping` probe whose failure is
//! surfaced distinctly from later query errors.

use std::time::Duration;

use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::AnyPool;

use leadbay_types::error::StoreError;

use crate::config::StorageConfig;

use super::dialect::Dialect;
use super::{bind_values, map_sqlx_error, SqlValue};

/// Pooled connection handle plus the dialect derived from the
/// connection URL. Cheap to clone; all clones share the same pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: AnyPool,
    dialect: Dialect,
}

impl Database {
    /// Create the process-wide pool from configuration.
    ///
    /// Fails with `Configuration` when no usable descriptor is present
    /// and `Connect` when the engine is unreachable. Does not retry;
    /// startup policy belongs to the caller.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let url = config.connection_url()?;
        let dialect = Dialect::from_url(&url)?;

        sqlx::any::install_default_drivers();

        let mut options = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs));

        if dialect == Dialect::Sqlite {
            // SQLite needs per-connection setup: foreign keys default to
            // off, and concurrent writers need WAL plus a busy timeout.
            options = options.after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA journal_mode = WAL")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            });
        }

        let pool = options.connect(&url).await.map_err(|e| match e {
            sqlx::Error::Configuration(e) => StoreError::Configuration(e.to_string()),
            other => StoreError::Connect(other.to_string()),
        })?;

        tracing::info!(dialect = ?dialect, "database pool created");
        Ok(Self { pool, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Connectivity probe, run once at startup. Failure here means the
    /// engine is unreachable, as opposed to a statement being rejected.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Connect(e.to_string()))
    }

    /// Drain and release all connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub(crate) async fn fetch_all(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> Result<Vec<AnyRow>, StoreError> {
        let rendered = self.dialect.render(sql);
        bind_values(sqlx::query(&rendered), args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(sql, e))
    }

    pub(crate) async fn fetch_optional(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> Result<Option<AnyRow>, StoreError> {
        let rendered = self.dialect.render(sql);
        bind_values(sqlx::query(&rendered), args)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error(sql, e))
    }

    /// Run a `SELECT COUNT(*) ...` statement and read the single value.
    pub(crate) async fn fetch_count(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> Result<i64, StoreError> {
        use sqlx::Row;
        let rendered = self.dialect.render(sql);
        let row = bind_values(sqlx::query(&rendered), args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error(sql, e))?;
        row.try_get::<i64, _>(0).map_err(map_sqlx_error)
    }

    /// Execute a statement, returning the affected row count.
    pub(crate) async fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<u64, StoreError> {
        let rendered = self.dialect.render(sql);
        bind_values(sqlx::query(&rendered), args)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| query_error(sql, e))
    }

    /// Execute a statement verbatim (schema bootstrap path; no
    /// placeholders to render).
    pub(crate) async fn execute_raw(&self, sql: &str) -> Result<(), StoreError> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }

    /// Insert a row and return it, as one connection-scoped operation.
    ///
    /// Engines with `RETURNING` yield the row from the insert itself.
    /// The others report a session-scoped last-insert id, so the insert
    /// and the read-back run on a single checked-out connection; ids
    /// from concurrent inserts on other connections cannot bleed in.
    pub(crate) async fn insert_and_fetch(
        &self,
        insert_sql: &str,
        args: &[SqlValue],
        table: &str,
    ) -> Result<AnyRow, StoreError> {
        if self.dialect.supports_returning() {
            let sql = format!("{insert_sql} RETURNING *");
            let rendered = self.dialect.render(&sql);
            return bind_values(sqlx::query(&rendered), args)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| query_error(insert_sql, e));
        }

        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;

        let rendered = self.dialect.render(insert_sql);
        let result = bind_values(sqlx::query(&rendered), args)
            .execute(&mut *conn)
            .await
            .map_err(|e| query_error(insert_sql, e))?;

        let id = result.last_insert_id().ok_or_else(|| {
            StoreError::Query(format!("engine returned no insert id for table {table}"))
        })?;

        let fetch_sql = format!("SELECT * FROM {table} WHERE id = ?");
        let rendered = self.dialect.render(&fetch_sql);
        sqlx::query(&rendered)
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| query_error(&fetch_sql, e))
    }
}

/// Map and log a failed statement. The statement text is logged for
/// context; parameter values never are.
fn query_error(sql: &str, e: sqlx::Error) -> StoreError {
    let mapped = map_sqlx_error(e);
    if let StoreError::Query(msg) = &mapped {
        tracing::warn!(statement = sql, error = %msg, "statement failed");
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::testing::sqlite_config;

    #[tokio::test]
    async fn test_connect_and_ping() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("t.db").display());
        let db = Database::connect(&sqlite_config(url)).await.unwrap();
        assert_eq!(db.dialect(), Dialect::Sqlite);
        db.ping().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_missing_descriptor_fails_with_configuration() {
        let mut config = sqlite_config(String::new());
        config.url = None;
        let err = Database::connect(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled_on_sqlite() {
        use sqlx::Row;
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("fk.db").display());
        let db = Database::connect(&sqlite_config(url)).await.unwrap();
        let row = db
            .fetch_optional("PRAGMA foreign_keys", &[])
            .await
            .unwrap()
            .unwrap();
        let enabled: i64 = row.try_get(0).unwrap();
        assert_eq!(enabled, 1);
    }
}
