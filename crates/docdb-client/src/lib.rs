//! # docdb-client
//!
//! High-level async client surface for DocDB deployments.
//!
//! This is the primary public API surface for the rust-docdb-driver project.
//! It ties connection configuration, the authentication handshake, and the
//! administrative command wrappers together over a pluggable transport.
//!
//! ## Features
//!
//! - **Connection strings**: `mongodb://` URI parsing including auth options
//! - **Async/await**: Built on Tokio for efficient async I/O
//! - **Pluggable transport**: every operation drives a [`CommandChannel`]
//! - **GSSAPI**: Kerberos single sign-on through the `docdb-auth` crate
//! - **Diagnostics**: server status, replica-set status, collection validation
//!
//! ## Authentication flow
//!
//! ```text
//! Config::from_connection_string() parses credentials and options
//!     -> authenticate() resolves the mechanism provider
//!     -> prepare() amends the handshake (no server round trips)
//!     -> auth() drives the mechanism conversation on the channel
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use docdb_client::{authenticate, Admin, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_connection_string(
//!         "mongodb://alice%40EXAMPLE.COM@db.example.com/?authMechanism=GSSAPI",
//!     )?;
//!
//!     // Any transport implementing CommandChannel works here.
//!     let mut channel = connect(&config).await?;
//!     authenticate(&mut channel, &config).await?;
//!
//!     let status = Admin::new(&mut channel).server_status().await?;
//!     println!("uptime: {:?}", status.get("uptime"));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod admin;
pub mod config;
pub mod database;
pub mod error;
pub mod handshake;

mod ops;

// Re-export commonly used types
pub use admin::Admin;
pub use config::Config;
pub use database::Database;
pub use docdb_auth::{AuthMechanism, Credentials};
pub use docdb_protocol::{ChannelError, CommandChannel};
pub use error::{Error, Result};
pub use handshake::{authenticate, authenticate_with, handshake_command, DRIVER_NAME};
