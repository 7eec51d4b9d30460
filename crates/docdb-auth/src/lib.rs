//! # docdb-auth
//!
//! SASL authentication mechanisms for DocDB connections.
//!
//! This crate is isolated from connection logic: mechanisms talk to the
//! server through the [`CommandChannel`](docdb_protocol::CommandChannel)
//! seam and to their security backend through capability traits, so the
//! whole conversation is testable without a server or a KDC.
//!
//! ## Supported mechanisms
//!
//! | Mechanism | Feature Flag | Description |
//! |-----------|--------------|-------------|
//! | GSSAPI | `gssapi` | Kerberos via libgssapi |
//! | SCRAM-SHA-1 / SCRAM-SHA-256 | - | Recognized, not implemented |
//! | PLAIN | - | Recognized, not implemented |
//! | MONGODB-X509 | - | Recognized, not implemented |
//!
//! Recognized-but-unimplemented mechanisms fail with
//! [`AuthError::Unsupported`] at provider selection.
//!
//! ## Two-phase attempts
//!
//! Every provider splits an attempt into `prepare` (validate, acquire
//! local state, before the connection handshake) and `auth` (run the
//! command conversation). See [`AuthProvider`].

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod credentials;
pub mod error;
pub mod gssapi;
pub mod properties;
pub mod provider;
pub mod resolver;
pub mod security;

#[cfg(feature = "gssapi")]
pub mod krb5;

pub use credentials::{Credentials, EXTERNAL_SOURCE};
pub use error::AuthError;
pub use gssapi::{GssapiAuthenticator, NegotiationState};
pub use provider::{AuthContext, AuthMechanism, AuthProvider, ServerAddress, provider_for};
pub use resolver::{HostResolver, ResolverError};
pub use security::{
    ExplicitIdentity, MissingKerberos, SecurityContext, SecurityContextProvider, SecurityError,
};
