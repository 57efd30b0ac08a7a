//! Verified callers and the credentials they present.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A caller whose bearer credential has been verified by the accounts service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Identity {
    /// Returns true if the caller may manage the catalog.
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// Opaque bearer credential taken from an `Authorization` header.
///
/// The raw value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Extracts the credential from an `Authorization` header value.
    ///
    /// Both `Bearer <value>` and `Token <value>` schemes are accepted.
    pub fn from_authorization_header(header: &str) -> Option<Self> {
        let value = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("Token "))?
            .trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    /// Returns the raw credential value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value to send in an outbound `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}
