//! # docdb-protocol
//!
//! Wire-level command building and reply interpretation for the DocDB
//! driver. Commands and replies are BSON documents; this crate knows how to
//! build the documents the driver sends (SASL conversation commands,
//! administrative commands) and how to read the handful of reply fields the
//! driver interprets.
//!
//! This crate is intentionally IO-agnostic: it contains no networking
//! logic. The single seam to a live server is the [`CommandChannel`] trait,
//! which a connection implements and everything above it consumes.
//!
//! ## Design principles
//!
//! - **One round trip at a time**: [`CommandChannel`] is sequential by
//!   contract, matching how a SASL conversation uses a connection.
//! - **Opaque payloads**: SASL payload bytes pass through untouched and are
//!   never logged by this crate.
//! - **Raw replies stay reachable**: [`CommandReply`] interprets fields
//!   without consuming the document, so callers can return it verbatim.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod admin;
pub mod channel;
pub mod error;
pub mod reply;
pub mod sasl;

pub use channel::{ChannelError, CommandChannel};
pub use error::ProtocolError;
pub use reply::CommandReply;
pub use sasl::SaslCommand;
