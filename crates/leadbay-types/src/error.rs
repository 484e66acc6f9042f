use thiserror::Error;

/// Errors from store operations (used by the trait definitions in
/// leadbay-core and mapped to HTTP responses in leadbay-api).
///
/// The variants track how an operation failed, not which entity it
/// touched: configuration problems are distinct from connectivity
/// problems, which are distinct from a statement the database rejected.
/// Callers decide policy (strict startup vs. file fallback, HTTP status
/// mapping); the store layer never retries on its own.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or placeholder connection descriptor. Fatal at startup in
    /// strict mode, triggers the file-fallback backend otherwise.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Network or authentication failure reaching the database.
    #[error("database connection error: {0}")]
    Connect(String),

    /// The pool could not hand out a connection within the acquire
    /// timeout. Transient; surfaced as a failed operation.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// The database rejected a statement (constraint violation, malformed
    /// SQL, decode failure). The message carries statement context but
    /// never parameter values.
    #[error("query error: {0}")]
    Query(String),

    /// Schema bootstrap failed on a statement that was not a
    /// duplicate-definition error.
    #[error("schema bootstrap error: {0}")]
    Schema(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("syntax error near SELECT".to_string());
        assert_eq!(err.to_string(), "query error: syntax error near SELECT");

        let err = StoreError::PoolExhausted;
        assert_eq!(err.to_string(), "connection pool exhausted");
    }

    #[test]
    fn test_configuration_error_display() {
        let err = StoreError::Configuration("no connection URL".to_string());
        assert!(err.to_string().contains("no connection URL"));
    }
}
