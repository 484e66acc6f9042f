//! User store trait and filter descriptor.

use leadbay_types::error::StoreError;
use leadbay_types::user::{CreateUser, UpdateUser, User};

use crate::page::{Page, PageRequest};

/// Filter criteria for listing users. `search` covers username and
/// email.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: PageRequest,
}

/// Repository trait for user persistence.
///
/// Password hashes never leave the store: creation and updates take
/// plaintext and hash internally, and authentication verifies inside the
/// store.
pub trait UserStore: Send + Sync {
    fn create(
        &self,
        input: CreateUser,
    ) -> impl std::future::Future<Output = Result<User, StoreError>> + Send;

    fn list(
        &self,
        filter: &UserFilter,
    ) -> impl std::future::Future<Output = Result<Page<User>, StoreError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;

    fn update(
        &self,
        id: i64,
        patch: UpdateUser,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Delete a user; the schema cascade-deletes their sessions.
    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Verify a username/password pair. Returns the user on success,
    /// `None` for an unknown username or wrong password.
    fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;
}
