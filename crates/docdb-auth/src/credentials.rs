//! Credential types for authentication.

use bson::{Bson, Document};

use crate::provider::AuthMechanism;

/// Name of the virtual database external mechanisms authenticate against.
pub const EXTERNAL_SOURCE: &str = "$external";

/// Credentials for a DocDB connection.
///
/// `mechanism_properties` is a free-form document; mechanisms read the keys
/// they understand (see [`crate::properties`]) and ignore the rest.
#[derive(Clone)]
pub struct Credentials {
    /// Principal to authenticate as, e.g. `alice@EXAMPLE.COM`.
    pub username: String,
    /// Password, when the mechanism and deployment need one. GSSAPI
    /// deployments usually rely on a ticket cache instead.
    pub password: Option<String>,
    /// Database the credentials are defined on.
    pub source: String,
    /// Mechanism to authenticate with.
    pub mechanism: AuthMechanism,
    /// Mechanism-specific options.
    pub mechanism_properties: Document,
}

impl Credentials {
    /// Creates credentials for `mechanism`, with the source defaulted per
    /// mechanism convention.
    pub fn new(username: impl Into<String>, mechanism: AuthMechanism) -> Self {
        Self {
            username: username.into(),
            password: None,
            source: mechanism.default_source().to_string(),
            mechanism,
            mechanism_properties: Document::new(),
        }
    }

    /// Sets the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Overrides the source database.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Adds one mechanism property.
    #[must_use]
    pub fn with_mechanism_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<Bson>,
    ) -> Self {
        self.mechanism_properties.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole mechanism property document.
    #[must_use]
    pub fn with_mechanism_properties(mut self, properties: Document) -> Self {
        self.mechanism_properties = properties;
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose sensitive data in debug output
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field(
                "password",
                &self.password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("source", &self.source)
            .field("mechanism", &self.mechanism)
            .field("mechanism_properties", &self.mechanism_properties)
            .finish()
    }
}
