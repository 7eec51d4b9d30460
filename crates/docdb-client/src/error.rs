//! Client error types.

use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Authentication(#[from] docdb_auth::AuthError),

    /// The server reply was malformed or reported command failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] docdb_protocol::ProtocolError),

    /// The command transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] docdb_protocol::ChannelError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A `validate` run reported the collection as invalid or corrupt.
    #[error("collection `{collection}` failed validation: {reason}")]
    InvalidCollection {
        /// The collection that was validated.
        collection: String,
        /// What the validation output said.
        reason: String,
    },

    /// Server-side JavaScript evaluation failed.
    #[error("eval failed: {0}")]
    Eval(String),
}

impl Error {
    /// Check if this error is transient and may succeed on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        use docdb_protocol::ChannelError;
        matches!(
            self,
            Self::Transport(ChannelError::Timeout | ChannelError::ConnectionClosed)
        )
    }

    /// Check if this error came out of the authentication subsystem.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
