//! Administrative and diagnostic commands against the `admin` database.

// Allow unwrap for regex patterns that are compile-time constants.
#![allow(clippy::unwrap_used)]

use bson::{Bson, Document};
use docdb_protocol::{admin, CommandChannel};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::ops::{execute_db_admin_command, execute_raw};

/// Administrative command surface over an authenticated channel.
pub struct Admin<'conn> {
    channel: &'conn mut dyn CommandChannel,
}

impl<'conn> Admin<'conn> {
    /// Wrap `channel` for administrative commands.
    pub fn new(channel: &'conn mut dyn CommandChannel) -> Self {
        Self { channel }
    }

    /// Fetch `serverStatus`.
    pub async fn server_status(&mut self) -> Result<Document> {
        let reply = execute_db_admin_command(&mut *self.channel, admin::server_status()).await?;
        Ok(reply.into_document())
    }

    /// Fetch `replSetGetStatus` from a replica-set member.
    pub async fn repl_set_get_status(&mut self) -> Result<Document> {
        let reply =
            execute_db_admin_command(&mut *self.channel, admin::repl_set_get_status()).await?;
        Ok(reply.into_document())
    }

    /// Validate a collection's on-disk structures.
    ///
    /// `options` are copied onto the command (`full: true` asks for a deep
    /// scan). A reply reporting corruption, or carrying `valid: false`, is
    /// an [`Error::InvalidCollection`].
    pub async fn validate_collection(
        &mut self,
        collection: &str,
        options: &Document,
    ) -> Result<Document> {
        let command = admin::validate_collection(collection, options);
        let reply = execute_raw(&mut *self.channel, "admin", command).await?;
        reply.check()?;

        let document = reply.into_document();
        // Older servers report findings as free-form text in `result`
        // instead of setting `valid`; scan it for their failure markers.
        if let Some(result) = document.get("result") {
            let Bson::String(result) = result else {
                return Err(Error::InvalidCollection {
                    collection: collection.to_string(),
                    reason: "validation data was not a string".to_string(),
                });
            };
            static CORRUPTION_RE: Lazy<Regex> =
                Lazy::new(|| Regex::new("exception|corrupt").unwrap());
            if CORRUPTION_RE.is_match(result) {
                return Err(Error::InvalidCollection {
                    collection: collection.to_string(),
                    reason: format!("validation output reports corruption: {result}"),
                });
            }
        }
        if let Ok(false) = document.get_bool("valid") {
            return Err(Error::InvalidCollection {
                collection: collection.to_string(),
                reason: "server marked the collection invalid".to_string(),
            });
        }
        Ok(document)
    }
}

impl std::fmt::Debug for Admin<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin").finish_non_exhaustive()
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
    async fn test_server_status_command_shape() {
        let mut channel = OneShotChannel::new(doc! { "ok": 1, "uptime": 42 });
        let status = Admin::new(&mut channel).server_status().await.unwrap();
        assert_eq!(status.get_i32("uptime"), Ok(42));

        let (database, command) = channel.seen.unwrap();
        assert_eq!(database, "admin");
        assert_eq!(command, doc! { "serverStatus": 1_i32 });
    }

    #[tokio::test]
    async fn test_validate_accepts_clean_report() {
        let mut channel = OneShotChannel::new(doc! {
            "ok": 1,
            "valid": true,
            "result": "no problems detected",
        });
        let report = Admin::new(&mut channel)
            .validate_collection("people", &doc! { "full": true })
            .await
            .unwrap();
        assert_eq!(report.get_bool("valid"), Ok(true));

        let (database, command) = channel.seen.unwrap();
        assert_eq!(database, "admin");
        assert_eq!(command.get_str("validate"), Ok("people"));
        assert_eq!(command.get_bool("full"), Ok(true));
    }

    #[tokio::test]
    async fn test_validate_flags_corruption_text() {
        let mut channel = OneShotChannel::new(doc! {
            "ok": 1,
            "valid": true,
            "result": "exception: btree is corrupt at offset 12",
        });
        let err = Admin::new(&mut channel)
            .validate_collection("people", &Document::new())
            .await
            .unwrap_err();
        match err {
            Error::InvalidCollection { collection, reason } => {
                assert_eq!(collection, "people");
                assert!(reason.contains("corruption"));
            }
            other => panic!("expected InvalidCollection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validate_rejects_non_string_result() {
        let mut channel = OneShotChannel::new(doc! { "ok": 1, "result": 7 });
        let err = Admin::new(&mut channel)
            .validate_collection("people", &Document::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }

    #[tokio::test]
    async fn test_validate_honors_valid_false() {
        let mut channel = OneShotChannel::new(doc! { "ok": 1, "valid": false });
        let err = Admin::new(&mut channel)
            .validate_collection("people", &Document::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCollection { .. }));
    }

    #[tokio::test]
    async fn test_validate_surfaces_command_failure() {
        let mut channel = OneShotChannel::new(doc! {
            "ok": 0,
            "errmsg": "no such collection",
            "code": 26,
        });
        let err = Admin::new(&mut channel)
            .validate_collection("people", &Document::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
