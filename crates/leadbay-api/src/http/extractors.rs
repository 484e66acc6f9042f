//! Session token authentication extractor.
//!
//! Dashboard routes extract [`Authenticated`], which resolves the
//! `Authorization: Bearer <token>` header against the session store and
//! loads the owning user. Expired sessions and dangling tokens are
//! rejected uniformly.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use leadbay_core::store::{Backend, SessionStore, UserStore};
use leadbay_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated request marker carrying the resolved user.
pub struct Authenticated(pub User);

impl<B: Backend> FromRequestParts<AppState<B>> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<B>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let session = state
            .backend
            .sessions()
            .get_by_token(&token)
            .await?
            .filter(|s| s.is_valid())
            .ok_or_else(|| AppError::Unauthorized("invalid or expired session".to_string()))?;

        let user = state
            .backend
            .users()
            .get_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired session".to_string()))?;

        Ok(Authenticated(user))
    }
}

fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    let Some(auth) = parts.headers.get("authorization") else {
        return Err(AppError::Unauthorized(
            "missing session token; provide 'Authorization: Bearer <token>'".to_string(),
        ));
    };
    let auth = auth
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid Authorization header encoding".to_string()))?;
    match auth.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AppError::Unauthorized(
            "malformed Authorization header; expected 'Bearer <token>'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/leads");
        if let Some(v) = value {
            builder = builder.header("authorization", v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc-123"));
        assert_eq!(extract_bearer_token(&parts).unwrap(), "abc-123");
    }

    #[test]
    fn test_missing_header_rejected() {
        let parts = parts_with_auth(None);
        assert!(matches!(
            extract_bearer_token(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            extract_bearer_token(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_empty_token_rejected() {
        let parts = parts_with_auth(Some("Bearer   "));
        assert!(matches!(
            extract_bearer_token(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }
}
