//! SASL conversation commands.
//!
//! A SASL conversation is a sequence of command round trips against a single
//! database: one `saslStart` followed by one or more `saslContinue`
//! commands, each carrying an opaque mechanism payload. The server assigns a
//! conversation id in its first reply and every later command must echo it.

use bson::spec::BinarySubtype;
use bson::{Binary, Document, doc};
use bytes::Bytes;

/// One client-to-server command in a SASL conversation.
///
/// Payload bytes are opaque to this layer; the authentication mechanism that
/// produced them is the only party that can interpret them.
#[derive(Debug, Clone)]
pub enum SaslCommand {
    /// Opens a conversation (`saslStart`).
    Start {
        /// SASL mechanism name, e.g. `GSSAPI`.
        mechanism: String,
        /// Initial mechanism token. May be empty.
        payload: Bytes,
        /// Ask the server to authorize the authenticated principal
        /// immediately. Always sent as `1` by this driver.
        auto_authorize: bool,
    },
    /// Continues an open conversation (`saslContinue`).
    Continue {
        /// Conversation id assigned by the server's `saslStart` reply.
        conversation_id: i32,
        /// Next mechanism token. May be empty.
        payload: Bytes,
    },
}

impl SaslCommand {
    /// Creates a `saslStart` command for `mechanism` with auto-authorization
    /// requested.
    pub fn start(mechanism: impl Into<String>, payload: Bytes) -> Self {
        Self::Start {
            mechanism: mechanism.into(),
            payload,
            auto_authorize: true,
        }
    }

    /// Creates a `saslContinue` command for an open conversation.
    pub fn continue_with(conversation_id: i32, payload: Bytes) -> Self {
        Self::Continue {
            conversation_id,
            payload,
        }
    }

    /// Length in bytes of the carried payload.
    ///
    /// Safe to log; the payload itself never is.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        match self {
            Self::Start { payload, .. } | Self::Continue { payload, .. } => payload.len(),
        }
    }

    /// Renders the command as the BSON document sent to the server.
    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::Start {
                mechanism,
                payload,
                auto_authorize,
            } => doc! {
                "saslStart": 1_i32,
                "mechanism": mechanism.as_str(),
                "payload": binary(payload),
                "autoAuthorize": i32::from(*auto_authorize),
            },
            Self::Continue {
                conversation_id,
                payload,
            } => doc! {
                "saslContinue": 1_i32,
                "conversationId": *conversation_id,
                "payload": binary(payload),
            },
        }
    }
}

fn binary(payload: &Bytes) -> Binary {
    Binary {
        subtype: BinarySubtype::Generic,
        bytes: payload.to_vec(),
    }
}
