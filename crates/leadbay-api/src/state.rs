//! Shared application state handed to every handler.

use std::sync::Arc;

use leadbay_core::store::Backend;

/// Dashboard session lifetime.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Handler state: the storage backend picked at startup. Generic so the
/// routing layer compiles one code path per backend with no dynamic
/// dispatch at the store seam.
pub struct AppState<B: Backend> {
    pub backend: Arc<B>,
}

impl<B: Backend> AppState<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}
