//! Hostname canonicalization capability.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a host resolver.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ResolverError {
    message: String,
}

impl ResolverError {
    /// Creates an error from a resolver message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Maps a configured hostname to its canonical form, typically by CNAME
/// lookup.
///
/// The distinction between outcomes matters to callers:
///
/// - `Ok` with entries: use the first entry as the canonical name.
/// - `Ok` empty: the lookup worked but found nothing; fall back to the
///   configured hostname.
/// - `Err`: the lookup itself failed; abort rather than guess.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Canonical names for `host`, most specific first.
    async fn canonical_names(&self, host: &str) -> Result<Vec<String>, ResolverError>;
}
