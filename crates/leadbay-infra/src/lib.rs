//! Infrastructure layer for Leadbay.
//!
//! Implementations of the store traits defined in `leadbay-core`:
//! a single SQL backend multiplexing PostgreSQL, MySQL, and SQLite
//! behind a dialect strategy, and a JSON-file fallback backend for
//! development without a database. Also home to storage configuration
//! loading and argon2 password hashing.

pub mod config;
pub mod file;
pub mod password;
pub mod sql;
