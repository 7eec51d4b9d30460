//! Canned documents and credentials for driver tests.

use bson::spec::BinarySubtype;
use bson::{doc, Binary, Document};
use docdb_auth::{AuthMechanism, Credentials, ServerAddress};

/// A successful SASL round reply carrying a challenge payload.
#[must_use]
pub fn sasl_reply(conversation_id: i32, payload: &[u8]) -> Document {
    doc! {
        "ok": 1,
        "conversationId": conversation_id,
        "payload": Binary {
            subtype: BinarySubtype::Generic,
            bytes: payload.to_vec(),
        },
        "done": false,
    }
}

/// The closing SASL reply: empty payload, `done: true`.
#[must_use]
pub fn sasl_final_reply(conversation_id: i32) -> Document {
    doc! {
        "ok": 1,
        "conversationId": conversation_id,
        "payload": Binary {
            subtype: BinarySubtype::Generic,
            bytes: Vec::new(),
        },
        "done": true,
    }
}

/// An `ok: 0` command failure with the server's code and message.
#[must_use]
pub fn command_failure(code: i32, message: &str) -> Document {
    doc! { "ok": 0, "code": code, "errmsg": message }
}

/// GSSAPI credentials for `username`, no password (ticket-cache style).
#[must_use]
pub fn gssapi_credentials(username: &str) -> Credentials {
    Credentials::new(username, AuthMechanism::Gssapi)
}

/// The server address tests authenticate against.
#[must_use]
pub fn address() -> ServerAddress {
    ServerAddress::new("db.example.com", 27017)
}
