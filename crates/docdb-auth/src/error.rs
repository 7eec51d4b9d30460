//! Authentication error types.

use thiserror::Error;

use docdb_protocol::{ChannelError, ProtocolError};

use crate::resolver::ResolverError;
use crate::security::SecurityError;

/// Errors that can occur during authentication.
///
/// Each variant identifies which stage of an attempt failed. The enum is
/// `Clone` so a failed negotiation can both record the error in its state
/// machine and return it to the caller.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Required configuration (host, port, credentials) is missing or
    /// inconsistent, or the mechanism was used out of order.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The Kerberos backend is not present in this build or host.
    #[error("kerberos support unavailable: {0}")]
    KerberosUnavailable(String),

    /// Hostname canonicalization failed.
    #[error("failed to canonicalize host `{host}`: {source}")]
    HostResolution {
        /// The hostname whose lookup failed.
        host: String,
        /// The resolver's failure.
        source: ResolverError,
    },

    /// The security backend could not create a context.
    #[error("failed to initialize security context: {0}")]
    SecurityInit(#[source] SecurityError),

    /// A security context operation failed during the conversation.
    #[error("security negotiation failed after {attempts} attempt(s): {source}")]
    SecurityNegotiation {
        /// Number of times the failing operation was attempted.
        attempts: u32,
        /// The backend's last failure.
        source: SecurityError,
    },

    /// Unsupported authentication mechanism.
    #[error("unsupported authentication mechanism: {0}")]
    Unsupported(String),

    /// The server reply was malformed or reported command failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The command transport failed mid-conversation.
    #[error("command transport failed: {0}")]
    Transport(#[from] ChannelError),
}

impl AuthError {
    /// Whether the failure happened before any command reached the server.
    ///
    /// Pre-flight failures leave the connection clean; conversation
    /// failures leave the server holding a dead SASL conversation.
    #[must_use]
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::KerberosUnavailable(_)
                | Self::HostResolution { .. }
                | Self::SecurityInit(_)
                | Self::Unsupported(_)
        )
    }
}

// SecurityError intentionally has no blanket From: negotiation failures
// need an attempt count, so conversions are explicit at each call site.
