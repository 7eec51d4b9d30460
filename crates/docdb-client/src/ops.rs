//! Command execution helpers shared by the admin and database surfaces.

use bson::Document;
use docdb_protocol::{CommandChannel, CommandReply};

use crate::error::Result;

/// Run `command` against `database` and return the reply without checking
/// its `ok` field. Callers with their own failure handling start here.
pub(crate) async fn execute_raw(
    channel: &mut dyn CommandChannel,
    database: &str,
    command: Document,
) -> Result<CommandReply> {
    // Log the command name only; arguments may carry sensitive values.
    let name = command
        .keys()
        .next()
        .map(String::as_str)
        .unwrap_or("(empty)");
    tracing::trace!(database, command = name, "running command");
    let reply = channel.run_command(database, command).await?;
    Ok(CommandReply::from(reply))
}

/// Run `command` and turn `ok: 0` replies into errors.
pub(crate) async fn execute_command(
    channel: &mut dyn CommandChannel,
    database: &str,
    command: Document,
) -> Result<CommandReply> {
    let reply = execute_raw(channel, database, command).await?;
    reply.check()?;
    Ok(reply)
}

/// Run an administrative command against the `admin` database.
pub(crate) async fn execute_db_admin_command(
    channel: &mut dyn CommandChannel,
    command: Document,
) -> Result<CommandReply> {
    execute_command(channel, "admin", command).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use bson::doc;
    use docdb_protocol::ChannelError;

    use super::*;
    use crate::error::Error;

    struct FixedChannel {
        reply: Document,
        last_database: Option<String>,
    }

    #[async_trait]
    impl CommandChannel for FixedChannel {
        async fn run_command(
            &mut self,
            database: &str,
            _command: Document,
        ) -> std::result::Result<Document, ChannelError> {
            self.last_database = Some(database.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_execute_raw_returns_failures_unchecked() {
        let mut channel = FixedChannel {
            reply: doc! { "ok": 0, "errmsg": "nope", "code": 11 },
            last_database: None,
        };
        let reply = execute_raw(&mut channel, "admin", doc! { "ping": 1 })
            .await
            .unwrap();
        assert!(!reply.is_ok());
    }

    #[tokio::test]
    async fn test_execute_command_checks_ok() {
        let mut channel = FixedChannel {
            reply: doc! { "ok": 0, "errmsg": "nope", "code": 11 },
            last_database: None,
        };
        let err = execute_command(&mut channel, "admin", doc! { "ping": 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_admin_commands_target_admin_database() {
        let mut channel = FixedChannel {
            reply: doc! { "ok": 1 },
            last_database: None,
        };
        execute_db_admin_command(&mut channel, doc! { "serverStatus": 1 })
            .await
            .unwrap();
        assert_eq!(channel.last_database.as_deref(), Some("admin"));
    }
}
