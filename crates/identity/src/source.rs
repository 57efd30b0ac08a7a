//! Sources of truth for credential verification.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::{Credential, Identity};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::AuthError;

/// Default timeout for a remote profile lookup.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Resolves a credential to the identity it belongs to, without caching.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// Looks up the identity owning `credential`.
    async fn fetch(&self, credential: &Credential) -> Result<Identity, AuthError>;
}

#[derive(Deserialize)]
struct ProfileResponse {
    user: Identity,
}

/// Looks up identities through the accounts service profile endpoint.
#[derive(Debug, Clone)]
pub struct HttpIdentitySource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpIdentitySource {
    /// Creates a source talking to the accounts service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Creates a source reusing an existing HTTP client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn profile_url(&self) -> String {
        format!("{}/api/auth/profile/", self.base_url)
    }
}

#[async_trait]
impl IdentitySource for HttpIdentitySource {
    #[tracing::instrument(skip_all)]
    async fn fetch(&self, credential: &Credential) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(self.profile_url())
            .header(
                reqwest::header::AUTHORIZATION,
                credential.authorization_header(),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "accounts service rejected credential");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        let profile: ProfileResponse = response.json().await?;
        Ok(profile.user)
    }
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    identities: HashMap<String, Identity>,
}

/// Static credential table, used in tests and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentitySource {
    state: Arc<RwLock<InMemoryIdentityState>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemoryIdentitySource {
    /// Creates an empty identity table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `identity` under the raw credential value `credential`.
    pub async fn register(&self, credential: impl Into<String>, identity: Identity) {
        self.state
            .write()
            .await
            .identities
            .insert(credential.into(), identity);
    }

    /// Forgets a credential, as if it had been revoked.
    pub async fn revoke(&self, credential: &str) {
        self.state.write().await.identities.remove(credential);
    }

    /// Returns how many lookups reached this source.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentitySource for InMemoryIdentitySource {
    async fn fetch(&self, credential: &Credential) -> Result<Identity, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.state
            .read()
            .await
            .identities
            .get(credential.as_str())
            .cloned()
            .ok_or(AuthError::Rejected { status: 401 })
    }
}
