//! Database-scoped commands.

use bson::{Bson, Document};
use docdb_protocol::{admin, CommandChannel};

use crate::error::{Error, Result};
use crate::ops::{execute_command, execute_raw};

/// Command surface scoped to one database.
pub struct Database<'conn> {
    channel: &'conn mut dyn CommandChannel,
    name: String,
}

impl<'conn> Database<'conn> {
    /// Wrap `channel` for commands against the database `name`.
    pub fn new(channel: &'conn mut dyn CommandChannel, name: impl Into<String>) -> Self {
        Self {
            channel,
            name: name.into(),
        }
    }

    /// The database name commands run against.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run an arbitrary command against this database.
    pub async fn run_command(&mut self, command: Document) -> Result<Document> {
        let reply = execute_command(&mut *self.channel, &self.name, command).await?;
        Ok(reply.into_document())
    }

    /// Fetch `dbStats`, optionally scaled (1024 reports sizes in KiB).
    pub async fn stats(&mut self, scale: Option<i32>) -> Result<Document> {
        let reply = execute_command(&mut *self.channel, &self.name, admin::db_stats(scale)).await?;
        Ok(reply.into_document())
    }

    /// Fetch `collStats` for a collection in this database.
    pub async fn collection_stats(
        &mut self,
        collection: &str,
        scale: Option<i32>,
    ) -> Result<Document> {
        let command = admin::coll_stats(collection, scale);
        let reply = execute_command(&mut *self.channel, &self.name, command).await?;
        Ok(reply.into_document())
    }

    /// Evaluate JavaScript on the server and return its `retval`.
    ///
    /// Removed from modern servers, still exercised against legacy
    /// deployments. Failures carry the server's `errmsg`.
    pub async fn eval(
        &mut self,
        code: &str,
        parameters: Vec<Bson>,
        nolock: Option<bool>,
    ) -> Result<Bson> {
        let command = admin::eval(code, parameters, nolock);
        let reply = execute_raw(&mut *self.channel, &self.name, command).await?;
        if reply.is_ok() {
            let retval = reply.document().get("retval").cloned().unwrap_or(Bson::Null);
            return Ok(retval);
        }
        Err(Error::Eval(
            reply.error_message().unwrap_or("eval failed").to_string(),
        ))
    }
}

impl std::fmt::Debug for Database<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use async_trait::async_trait;
    use bson::doc;
    use docdb_protocol::ChannelError;

    use super::*;

    struct OneShotChannel {
        reply: Document,
        seen: Option<(String, Document)>,
    }

    impl OneShotChannel {
        fn new(reply: Document) -> Self {
            Self { reply, seen: None }
        }
    }

    #[async_trait]
    impl CommandChannel for OneShotChannel {
        async fn run_command(
            &mut self,
            database: &str,
            command: Document,
        ) -> std::result::Result<Document, ChannelError> {
            self.seen = Some((database.to_string(), command));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_commands_target_the_named_database() {
        let mut channel = OneShotChannel::new(doc! { "ok": 1 });
        Database::new(&mut channel, "reports")
            .run_command(doc! { "ping": 1 })
            .await
            .unwrap();
        let (database, _) = channel.seen.unwrap();
        assert_eq!(database, "reports");
    }

    #[tokio::test]
    async fn test_stats_command_shapes() {
        let mut channel = OneShotChannel::new(doc! { "ok": 1, "objects": 3 });
        Database::new(&mut channel, "reports")
            .stats(Some(1024))
            .await
            .unwrap();
        let (_, command) = channel.seen.unwrap();
        assert_eq!(command, doc! { "dbStats": 1_i32, "scale": 1024_i32 });

        let mut channel = OneShotChannel::new(doc! { "ok": 1, "count": 9 });
        Database::new(&mut channel, "reports")
            .collection_stats("people", None)
            .await
            .unwrap();
        let (_, command) = channel.seen.unwrap();
        assert_eq!(command, doc! { "collStats": "people" });
    }

    #[tokio::test]
    async fn test_eval_returns_retval() {
        let mut channel = OneShotChannel::new(doc! { "ok": 1, "retval": 3.5 });
        let value = Database::new(&mut channel, "reports")
            .eval("function (x) { return x; }", vec![Bson::Double(3.5)], None)
            .await
            .unwrap();
        assert_eq!(value, Bson::Double(3.5));
    }

    #[tokio::test]
    async fn test_eval_missing_retval_is_null() {
        let mut channel = OneShotChannel::new(doc! { "ok": 1 });
        let value = Database::new(&mut channel, "reports")
            .eval("function () {}", Vec::new(), None)
            .await
            .unwrap();
        assert_eq!(value, Bson::Null);
    }

    #[tokio::test]
    async fn test_eval_failure_carries_errmsg() {
        let mut channel = OneShotChannel::new(doc! {
            "ok": 0,
            "errmsg": "ReferenceError: x is not defined",
        });
        let err = Database::new(&mut channel, "reports")
            .eval("x", Vec::new(), Some(true))
            .await
            .unwrap_err();
        match err {
            Error::Eval(message) => assert!(message.contains("ReferenceError")),
            other => panic!("expected Eval, got {other:?}"),
        }
    }
}
