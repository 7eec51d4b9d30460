//! # docdb-testing
//!
//! Test infrastructure for DocDB driver development.
//!
//! This crate provides scripted doubles for the driver's capability seams
//! so authentication and command flows can be tested without a server or a
//! Kerberos installation.
//!
//! ## Features
//!
//! - Scripted command channel with full traffic recording
//! - Scripted security backend with a call journal
//! - Scripted hostname resolver
//! - Canned SASL reply fixtures
//!
//! ## Example
//!
//! ```rust,ignore
//! use docdb_testing::{fixtures, ScriptedChannel, ScriptedSecurity};
//!
//! #[tokio::test]
//! async fn test_auth_traffic() {
//!     let security = ScriptedSecurity::new();
//!     let journal = security.journal();
//!     let mut channel = ScriptedChannel::new()
//!         .with_reply(fixtures::sasl_reply(1, b"challenge"))
//!         .with_reply(fixtures::sasl_reply(1, b"layer"))
//!         .with_reply(fixtures::sasl_final_reply(1));
//!
//!     // Drive an authenticator over the scripted pieces, then assert on
//!     // channel.sent() and the journal.
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod fixtures;
pub mod mock_channel;
pub mod mock_security;

pub use mock_channel::{RecordedCommand, ScriptedChannel, ScriptedReply};
pub use mock_security::{
    ResolverOutcome, ScriptedResolver, ScriptedSecurity, SecurityJournal,
};
