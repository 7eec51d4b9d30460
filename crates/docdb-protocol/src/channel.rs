//! The command transport seam.
//!
//! Everything above the wire (authentication, admin helpers) talks to the
//! server through [`CommandChannel`]. Production code implements it over a
//! live connection; tests implement it over a scripted reply queue.

use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use thiserror::Error;

/// Transport failure while running a command.
///
/// `Io` wraps the error in an [`Arc`] so channel errors stay cloneable; an
/// authentication attempt records the error that failed it while also
/// returning it to the caller.
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    /// The connection was closed before or during the round trip.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O failure on the underlying transport.
    #[error("i/o failure: {0}")]
    Io(#[source] Arc<std::io::Error>),

    /// The round trip did not finish within the transport's deadline.
    #[error("operation timed out")]
    Timeout,

    /// Any other transport-defined failure.
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// A sequential command transport: send one command document to one
/// database, receive one reply document.
///
/// Implementations are not required to support concurrent round trips; the
/// driver issues commands one at a time through `&mut self`. The `Sync`
/// bound lets an authentication future holding `&mut dyn CommandChannel`
/// run on a spawned task.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Runs `command` against `database` and returns the server's reply
    /// document.
    async fn run_command(
        &mut self,
        database: &str,
        command: Document,
    ) -> Result<Document, ChannelError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bson::doc;

    struct EchoChannel;

    #[async_trait]
    impl CommandChannel for EchoChannel {
        async fn run_command(
            &mut self,
            database: &str,
            command: Document,
        ) -> Result<Document, ChannelError> {
            Ok(doc! { "ok": 1.0, "db": database, "echo": command })
        }
    }

    #[tokio::test]
    async fn test_trait_object_round_trip() {
        let mut channel = EchoChannel;
        let channel: &mut dyn CommandChannel = &mut channel;

        let reply = channel
            .run_command("admin", doc! { "ping": 1_i32 })
            .await
            .unwrap();
        assert_eq!(reply.get_str("db"), Ok("admin"));
    }

    #[test]
    fn test_io_errors_convert_and_clone() {
        let err: ChannelError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into();
        let cloned = err.clone();
        assert!(cloned.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_display_messages_are_lowercase() {
        assert_eq!(ChannelError::ConnectionClosed.to_string(), "connection closed");
        assert_eq!(ChannelError::Timeout.to_string(), "operation timed out");
    }

    #[test]
    fn test_channel_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn CommandChannel>();
    }
}
