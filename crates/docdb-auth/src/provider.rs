//! Authentication provider traits and mechanism selection.

use std::str::FromStr;

use async_trait::async_trait;
use bson::Document;

use docdb_protocol::CommandChannel;

use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::gssapi::GssapiAuthenticator;

/// Authentication mechanism enumeration.
///
/// Names follow the SASL registry plus the driver-specific `MONGODB-X509`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMechanism {
    /// Kerberos via GSSAPI.
    Gssapi,
    /// SCRAM with SHA-1.
    ScramSha1,
    /// SCRAM with SHA-256.
    ScramSha256,
    /// Plain-text SASL, used for LDAP proxy authentication.
    Plain,
    /// X.509 client certificate.
    X509,
}

impl AuthMechanism {
    /// The mechanism name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gssapi => "GSSAPI",
            Self::ScramSha1 => "SCRAM-SHA-1",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::Plain => "PLAIN",
            Self::X509 => "MONGODB-X509",
        }
    }

    /// Database the mechanism conventionally authenticates against.
    #[must_use]
    pub fn default_source(&self) -> &'static str {
        match self {
            Self::Gssapi | Self::Plain | Self::X509 => "$external",
            Self::ScramSha1 | Self::ScramSha256 => "admin",
        }
    }

    /// Whether this mechanism runs a SASL conversation.
    #[must_use]
    pub fn is_sasl(&self) -> bool {
        !matches!(self, Self::X509)
    }
}

impl FromStr for AuthMechanism {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GSSAPI" => Ok(Self::Gssapi),
            "SCRAM-SHA-1" => Ok(Self::ScramSha1),
            "SCRAM-SHA-256" => Ok(Self::ScramSha256),
            "PLAIN" => Ok(Self::Plain),
            "MONGODB-X509" => Ok(Self::X509),
            other => Err(AuthError::Unsupported(other.to_string())),
        }
    }
}

impl std::fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network address of the server being authenticated against.
///
/// The port is optional so that an address parsed without one can still be
/// represented; mechanisms that require a port report its absence as a
/// configuration error instead of inventing a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    /// Hostname as configured, before any canonicalization.
    pub host: String,
    /// Port, when one was configured.
    pub port: Option<u16>,
}

impl ServerAddress {
    /// Creates an address with a known port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }
}

impl std::fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

/// Everything an authentication attempt needs from its connection.
///
/// Borrows the connection's command channel for the duration of the
/// attempt; the connection cannot run other commands until the attempt
/// finishes, which matches the sequential nature of a SASL conversation.
pub struct AuthContext<'conn> {
    /// Address of the server end of the connection.
    pub address: ServerAddress,
    /// Credentials to authenticate, if any were configured.
    pub credentials: Option<Credentials>,
    /// Command transport for the conversation.
    pub channel: &'conn mut dyn CommandChannel,
}

impl<'conn> AuthContext<'conn> {
    /// Creates a context for one authentication attempt.
    pub fn new(
        address: ServerAddress,
        credentials: Option<Credentials>,
        channel: &'conn mut dyn CommandChannel,
    ) -> Self {
        Self {
            address,
            credentials,
            channel,
        }
    }

    /// The connection fields SASL mechanisms require, or a configuration
    /// error naming every missing one.
    pub fn connection_fields(&self) -> Result<(&str, u16, &Credentials), AuthError> {
        let mut missing = Vec::new();
        if self.address.host.is_empty() {
            missing.push("host");
        }
        let port = self.address.port;
        if port.is_none() {
            missing.push("port");
        }
        let credentials = self.credentials.as_ref();
        if credentials.is_none() {
            missing.push("credentials");
        }
        match (port, credentials) {
            (Some(port), Some(credentials)) if missing.is_empty() => {
                Ok((self.address.host.as_str(), port, credentials))
            }
            _ => Err(AuthError::Configuration(format!(
                "connection must specify: {}",
                missing.join(", ")
            ))),
        }
    }
}

impl std::fmt::Debug for AuthContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("address", &self.address)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Trait for authentication providers.
///
/// A provider runs one authentication attempt in two phases:
///
/// 1. [`prepare`](AuthProvider::prepare) before the connection handshake.
///    The provider validates configuration, acquires whatever local state
///    it needs (for GSSAPI, the security context), and may amend the
///    handshake command it is handed.
/// 2. [`auth`](AuthProvider::auth) after the handshake, running the actual
///    command conversation.
///
/// Providers are single-use: one instance drives one attempt on one
/// connection. Retrying authentication means constructing a new provider.
#[async_trait]
pub trait AuthProvider: Send {
    /// The mechanism this provider implements.
    fn mechanism(&self) -> AuthMechanism;

    /// Validates configuration and acquires pre-handshake state, returning
    /// the (possibly amended) handshake command.
    async fn prepare(
        &mut self,
        handshake: Document,
        ctx: &AuthContext<'_>,
    ) -> Result<Document, AuthError>;

    /// Runs the authentication conversation, returning the server's final
    /// reply document verbatim.
    async fn auth(&mut self, ctx: &mut AuthContext<'_>) -> Result<Document, AuthError>;
}

/// Selects a provider for the credentials' mechanism.
///
/// Only GSSAPI is implemented; other mechanisms report
/// [`AuthError::Unsupported`] so callers can distinguish "not configured"
/// from "not built".
pub fn provider_for(credentials: &Credentials) -> Result<Box<dyn AuthProvider>, AuthError> {
    match credentials.mechanism {
        AuthMechanism::Gssapi => Ok(Box::new(GssapiAuthenticator::with_default_provider())),
        other => Err(AuthError::Unsupported(other.as_str().to_string())),
    }
}
