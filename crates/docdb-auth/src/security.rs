//! Security context capability traits.
//!
//! The GSSAPI negotiation engine never talks to a Kerberos library
//! directly. It drives a [`SecurityContext`] obtained from a
//! [`SecurityContextProvider`], both injected at construction. The `gssapi`
//! feature supplies a libgssapi-backed provider; tests supply scripted ones.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a security context or its provider.
///
/// Backends reduce their native error types to a message; the negotiation
/// engine wraps this with conversation context (which phase, how many
/// attempts) before surfacing it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SecurityError {
    message: String,
}

impl SecurityError {
    /// Creates an error from a backend message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The backend's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Explicit identity for context initialization.
///
/// Only used when the caller supplied a password; otherwise the backend
/// relies on ambient credentials such as a Kerberos ticket cache.
#[derive(Clone, Copy)]
pub struct ExplicitIdentity<'a> {
    /// Principal to authenticate as.
    pub username: &'a str,
    /// Password for that principal.
    pub password: &'a str,
}

impl std::fmt::Debug for ExplicitIdentity<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose sensitive data in debug output
        f.debug_struct("ExplicitIdentity")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// An in-progress security negotiation with a remote service.
///
/// All byte buffers are opaque mechanism tokens. Implementations must not
/// block the calling task; backends over blocking libraries offload to a
/// blocking pool.
#[async_trait]
pub trait SecurityContext: Send {
    /// Advances the negotiation with a server challenge, producing the next
    /// client token. The first call passes an empty challenge. Either side
    /// of the exchange may be empty.
    async fn step(&mut self, challenge: &[u8]) -> Result<Vec<u8>, SecurityError>;

    /// Decrypts/verifies a server message under the established context.
    async fn unwrap(&mut self, message: &[u8]) -> Result<Vec<u8>, SecurityError>;

    /// Protects a client message under the established context, optionally
    /// tagging it with the authorization identity.
    async fn wrap(&mut self, message: &[u8], user: Option<&str>) -> Result<Vec<u8>, SecurityError>;
}

/// Source of [`SecurityContext`] instances.
///
/// Availability is checked before any network traffic so a missing backend
/// fails fast with a clear message.
#[async_trait]
pub trait SecurityContextProvider: Send + Sync {
    /// Verifies the backend is usable in this build/host.
    fn ensure_available(&self) -> Result<(), SecurityError>;

    /// Creates a context targeting `principal` (e.g. `mongodb@db.example.com`),
    /// authenticating with `identity` when one is given.
    async fn initialize(
        &self,
        principal: &str,
        identity: Option<ExplicitIdentity<'_>>,
    ) -> Result<Box<dyn SecurityContext>, SecurityError>;
}

/// Provider used when the driver is built without a Kerberos backend.
///
/// Mirrors what a dynamic-import failure would report: the backend is
/// named unavailable up front, before any conversation starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingKerberos;

#[async_trait]
impl SecurityContextProvider for MissingKerberos {
    fn ensure_available(&self) -> Result<(), SecurityError> {
        Err(SecurityError::new(
            "no Kerberos backend in this build; enable the `gssapi` feature of docdb-auth",
        ))
    }

    async fn initialize(
        &self,
        _principal: &str,
        _identity: Option<ExplicitIdentity<'_>>,
    ) -> Result<Box<dyn SecurityContext>, SecurityError> {
        Err(SecurityError::new("kerberos support unavailable"))
    }
}
