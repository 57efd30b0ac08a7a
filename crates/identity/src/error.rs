//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while verifying a credential.
///
/// None of these are retried: an authentication failure is not recoverable
/// within the request that triggered it.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential was presented.
    #[error("Authentication credentials were not provided")]
    MissingCredential,

    /// The accounts service refused the credential.
    #[error("Invalid token: accounts service responded with status {status}")]
    Rejected { status: u16 },

    /// The accounts service did not answer in time.
    #[error("Authentication failed: accounts service timed out")]
    Timeout,

    /// The accounts service could not be reached or sent a malformed reply.
    #[error("Authentication failed: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::Unavailable(err.to_string())
        }
    }
}
