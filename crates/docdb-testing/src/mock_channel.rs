//! Scripted command channel for unit testing.
//!
//! [`ScriptedChannel`] replays a queue of pre-configured replies and records
//! every command it is asked to run, so tests can assert on the exact
//! traffic a component produced without any server.

use std::collections::VecDeque;

use async_trait::async_trait;
use bson::Document;
use docdb_protocol::{ChannelError, CommandChannel};

/// One scripted reply served by [`ScriptedChannel`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Hand this document back as the server reply.
    Reply(Document),
    /// Fail the round trip at the transport level.
    Transport(ChannelError),
}

/// A command recorded by [`ScriptedChannel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    /// Database the command targeted.
    pub database: String,
    /// The command document exactly as sent.
    pub command: Document,
}

/// [`CommandChannel`] implementation backed by a script.
///
/// Commands are recorded before the reply is served, so traffic assertions
/// hold even for round trips that fail.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    replies: VecDeque<ScriptedReply>,
    sent: Vec<RecordedCommand>,
}

impl ScriptedChannel {
    /// Creates a channel with an empty script. Any command run against it
    /// fails with an exhaustion error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    #[must_use]
    pub fn with_reply(mut self, reply: Document) -> Self {
        self.replies.push_back(ScriptedReply::Reply(reply));
        self
    }

    /// Queues a transport failure.
    #[must_use]
    pub fn with_failure(mut self, error: ChannelError) -> Self {
        self.replies.push_back(ScriptedReply::Transport(error));
        self
    }

    /// Commands recorded so far, in order.
    #[must_use]
    pub fn sent(&self) -> &[RecordedCommand] {
        &self.sent
    }

    /// Number of round trips attempted so far.
    #[must_use]
    pub fn round_trips(&self) -> usize {
        self.sent.len()
    }
}

#[async_trait]
impl CommandChannel for ScriptedChannel {
    async fn run_command(
        &mut self,
        database: &str,
        command: Document,
    ) -> Result<Document, ChannelError> {
        self.sent.push(RecordedCommand {
            database: database.to_string(),
            command,
        });
        match self.replies.pop_front() {
            Some(ScriptedReply::Reply(document)) => Ok(document),
            Some(ScriptedReply::Transport(error)) => Err(error),
            None => Err(ChannelError::Other(
                "scripted channel exhausted".to_string(),
            )),
        }
    }
}
