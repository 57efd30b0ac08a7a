//! Identity verification for the storefront services.
//!
//! Every service authenticates callers by handing the bearer credential to
//! the accounts service and trusting the identity it returns. To avoid a
//! remote round-trip per request, successful verifications are cached for a
//! bounded time-to-live:
//!
//! 1. Cache hit: return the previously observed identity.
//! 2. Cache miss: ask the [`IdentitySource`] (short timeout, no retries).
//! 3. On success populate the cache; failures are never cached.

pub mod cache;
pub mod error;
pub mod source;
pub mod verifier;

pub use cache::TtlCache;
pub use error::AuthError;
pub use source::{
    DEFAULT_AUTH_TIMEOUT, HttpIdentitySource, IdentitySource, InMemoryIdentitySource,
};
pub use verifier::{CachingIdentityVerifier, DEFAULT_CACHE_TTL, IdentityVerifier};
