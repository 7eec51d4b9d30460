//! Protocol-level error types.

use thiserror::Error;

/// Errors produced while interpreting a server command reply.
///
/// These cover malformed or failed replies. Transport-level failures are
/// reported separately as [`ChannelError`](crate::channel::ChannelError).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// The server reported command failure (`ok: 0`).
    #[error("command failed: {message}")]
    CommandFailed {
        /// Server error code, when the reply carried one.
        code: Option<i32>,
        /// Server error message (`errmsg`), or a generic fallback.
        message: String,
    },

    /// A field the reply must carry is absent.
    #[error("reply is missing required field `{0}`")]
    MissingField(&'static str),

    /// A reply field was present but carried an unusable BSON type.
    #[error("reply field `{field}` has unexpected type (expected {expected})")]
    UnexpectedType {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the type that was expected.
        expected: &'static str,
    },

    /// A reply echoed a different conversation id than the one the server
    /// assigned when the conversation started.
    #[error("conversation id changed mid-conversation (started {started}, reply carried {received})")]
    ConversationIdMismatch {
        /// Conversation id the server assigned in its first reply.
        started: i32,
        /// Conversation id found in the offending reply.
        received: i32,
    },
}
