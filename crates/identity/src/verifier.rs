//! Cached credential verification.

use std::time::Duration;

use async_trait::async_trait;
use common::{Credential, Identity};

use crate::cache::TtlCache;
use crate::error::AuthError;
use crate::source::IdentitySource;

/// How long a successful verification is trusted without asking again.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Turns a bearer credential into a verified identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies `credential`, returning the identity it belongs to.
    async fn verify(&self, credential: &Credential) -> Result<Identity, AuthError>;
}

/// Verifier that remembers successful lookups for a bounded time.
///
/// A cache hit returns the previously observed identity without contacting
/// the source. A revoked credential therefore stays usable until its entry
/// expires.
#[derive(Debug, Clone)]
pub struct CachingIdentityVerifier<S> {
    source: S,
    cache: TtlCache<Credential, Identity>,
}

impl<S: IdentitySource> CachingIdentityVerifier<S> {
    /// Creates a verifier with the default time-to-live.
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, DEFAULT_CACHE_TTL)
    }

    /// Creates a verifier caching successful lookups for `ttl`.
    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &TtlCache<Credential, Identity> {
        &self.cache
    }
}

#[async_trait]
impl<S: IdentitySource> IdentityVerifier for CachingIdentityVerifier<S> {
    #[tracing::instrument(skip_all)]
    async fn verify(&self, credential: &Credential) -> Result<Identity, AuthError> {
        if credential.as_str().is_empty() {
            return Err(AuthError::MissingCredential);
        }

        if let Some(identity) = self.cache.get(credential).await {
            metrics::counter!("identity_cache_hits_total").increment(1);
            return Ok(identity);
        }
        metrics::counter!("identity_cache_misses_total").increment(1);

        match self.source.fetch(credential).await {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.id, "credential verified");
                self.cache.insert(credential.clone(), identity.clone()).await;
                Ok(identity)
            }
            Err(e) => {
                metrics::counter!("identity_verification_failures_total").increment(1);
                tracing::info!(error = %e, "credential verification failed");
                Err(e)
            }
        }
    }
}
