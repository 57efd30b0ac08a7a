//! Request authentication.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use checkout::Caller;
use common::Credential;
use identity::{AuthError, IdentityVerifier};

use crate::error::ApiError;

/// Shared credential verifier, reachable from every service's state.
pub type SharedVerifier = Arc<dyn IdentityVerifier>;

/// Extracts the verified caller from the `Authorization` header.
///
/// Rejects the request with 401 when the header is missing or the credential
/// does not verify.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Caller);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    SharedVerifier: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(Credential::from_authorization_header)
            .ok_or(AuthError::MissingCredential)?;

        let verifier = <SharedVerifier as FromRef<S>>::from_ref(state);
        let identity = verifier.verify(&credential).await.map_err(|e| {
            tracing::debug!(error = %e, "credential rejected");
            e
        })?;

        Ok(Authenticated(Caller::new(identity, credential)))
    }
}

/// Fails with 403 unless the caller may manage the catalog.
pub fn require_admin(caller: &Caller, action: &str) -> Result<(), ApiError> {
    if caller.identity.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "You do not have permission to {action}."
        )))
    }
}
