//! Server command reply handling.

use bson::{Bson, Document};
use bytes::Bytes;

use crate::error::ProtocolError;

/// A server reply to a single command.
///
/// Wraps the raw reply document and offers typed accessors for the handful
/// of fields the driver interprets. The full document stays reachable so a
/// caller can hand it back to the application verbatim.
#[derive(Debug, Clone)]
pub struct CommandReply {
    document: Document,
}

impl CommandReply {
    /// Wraps a raw reply document.
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Whether the server marked the command successful.
    ///
    /// The `ok` field is numeric on the wire (`1.0` / `0.0` from real
    /// servers) but booleans and integers are tolerated too. A missing `ok`
    /// field counts as failure.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        match self.document.get("ok") {
            Some(Bson::Double(value)) => *value != 0.0,
            Some(Bson::Int32(value)) => *value != 0,
            Some(Bson::Int64(value)) => *value != 0,
            Some(Bson::Boolean(value)) => *value,
            _ => false,
        }
    }

    /// Server error message (`errmsg`), if present.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.document.get_str("errmsg").ok()
    }

    /// Server error code (`code`), if present.
    #[must_use]
    pub fn error_code(&self) -> Option<i32> {
        self.document.get_i32("code").ok()
    }

    /// Returns an error carrying the server's message when the reply marks
    /// the command as failed.
    pub fn check(&self) -> Result<(), ProtocolError> {
        if self.is_ok() {
            return Ok(());
        }
        Err(ProtocolError::CommandFailed {
            code: self.error_code(),
            message: self
                .error_message()
                .unwrap_or("server returned ok: 0 without errmsg")
                .to_string(),
        })
    }

    /// The conversation id carried by a SASL reply.
    ///
    /// Servers send an int32; an int64 that fits is accepted as well.
    pub fn conversation_id(&self) -> Result<i32, ProtocolError> {
        match self.document.get("conversationId") {
            Some(Bson::Int32(id)) => Ok(*id),
            Some(Bson::Int64(id)) => {
                i32::try_from(*id).map_err(|_| ProtocolError::UnexpectedType {
                    field: "conversationId",
                    expected: "32-bit integer",
                })
            }
            Some(_) => Err(ProtocolError::UnexpectedType {
                field: "conversationId",
                expected: "32-bit integer",
            }),
            None => Err(ProtocolError::MissingField("conversationId")),
        }
    }

    /// The opaque payload bytes carried by a SASL reply.
    pub fn payload(&self) -> Result<Bytes, ProtocolError> {
        match self.document.get("payload") {
            Some(Bson::Binary(bin)) => Ok(Bytes::copy_from_slice(&bin.bytes)),
            Some(_) => Err(ProtocolError::UnexpectedType {
                field: "payload",
                expected: "binary",
            }),
            None => Err(ProtocolError::MissingField("payload")),
        }
    }

    /// Whether the server flagged the SASL conversation as complete.
    #[must_use]
    pub fn done(&self) -> bool {
        self.document.get_bool("done").unwrap_or(false)
    }

    /// Borrows the underlying reply document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consumes the reply, returning the raw document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }
}

impl From<Document> for CommandReply {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use bson::doc;
    use bson::spec::BinarySubtype;

    #[test]
    fn test_ok_accepts_numeric_and_boolean_forms() {
        assert!(CommandReply::new(doc! { "ok": 1.0 }).is_ok());
        assert!(CommandReply::new(doc! { "ok": 1_i32 }).is_ok());
        assert!(CommandReply::new(doc! { "ok": 1_i64 }).is_ok());
        assert!(CommandReply::new(doc! { "ok": true }).is_ok());
        assert!(!CommandReply::new(doc! { "ok": 0.0 }).is_ok());
        assert!(!CommandReply::new(doc! { "ok": false }).is_ok());
        assert!(!CommandReply::new(doc! {}).is_ok());
    }

    #[test]
    fn test_check_carries_server_message() {
        let reply = CommandReply::new(doc! { "ok": 0.0, "errmsg": "no mechanism", "code": 2 });
        match reply.check() {
            Err(ProtocolError::CommandFailed { code, message }) => {
                assert_eq!(code, Some(2));
                assert_eq!(message, "no mechanism");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_check_without_errmsg_uses_fallback() {
        let reply = CommandReply::new(doc! { "ok": 0.0 });
        match reply.check() {
            Err(ProtocolError::CommandFailed { code, message }) => {
                assert_eq!(code, None);
                assert!(message.contains("ok: 0"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_conversation_id_extraction() {
        let reply = CommandReply::new(doc! { "conversationId": 4_i32 });
        assert_eq!(reply.conversation_id(), Ok(4));

        let wide = CommandReply::new(doc! { "conversationId": 4_i64 });
        assert_eq!(wide.conversation_id(), Ok(4));

        let overflow = CommandReply::new(doc! { "conversationId": i64::MAX });
        assert!(matches!(
            overflow.conversation_id(),
            Err(ProtocolError::UnexpectedType { .. })
        ));

        let absent = CommandReply::new(doc! {});
        assert_eq!(
            absent.conversation_id(),
            Err(ProtocolError::MissingField("conversationId"))
        );
    }

    #[test]
    fn test_payload_requires_binary() {
        let reply = CommandReply::new(doc! {
            "payload": bson::Binary { subtype: BinarySubtype::Generic, bytes: b"xyz".to_vec() },
        });
        assert_eq!(reply.payload().as_deref(), Ok(b"xyz".as_slice()));

        let wrong = CommandReply::new(doc! { "payload": "base64-text" });
        assert!(matches!(
            wrong.payload(),
            Err(ProtocolError::UnexpectedType { field: "payload", .. })
        ));

        let absent = CommandReply::new(doc! {});
        assert_eq!(absent.payload(), Err(ProtocolError::MissingField("payload")));
    }

    #[test]
    fn test_done_defaults_to_false() {
        assert!(!CommandReply::new(doc! {}).done());
        assert!(CommandReply::new(doc! { "done": true }).done());
    }
}
