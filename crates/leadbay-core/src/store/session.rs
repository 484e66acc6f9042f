//! Session store trait.
//!
//! Sessions have a narrower contract than the other entities: the opaque
//! token is the sole lookup key, and validity is a property of
//! `expires_at` checked by the caller via [`Session::is_valid`].
//!
//! [`Session::is_valid`]: leadbay_types::user::Session::is_valid

use leadbay_types::error::StoreError;
use leadbay_types::user::Session;

/// Repository trait for dashboard session persistence.
pub trait SessionStore: Send + Sync {
    /// Create a session for a user, expiring `ttl_secs` from now. The
    /// store mints the opaque token.
    fn create(
        &self,
        user_id: i64,
        ttl_secs: i64,
    ) -> impl std::future::Future<Output = Result<Session, StoreError>> + Send;

    /// Look up a session by token. Returns expired sessions too; the
    /// caller checks validity.
    fn get_by_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Delete a session by token (logout). Idempotent.
    fn delete_by_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete all expired sessions, returning how many were removed.
    fn delete_expired(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}
