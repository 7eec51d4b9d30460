//! Connection handshake and authentication entry points.

use bson::{doc, Document};
use docdb_auth::{provider_for, AuthContext, AuthError, AuthProvider};
use docdb_protocol::CommandChannel;

use crate::config::Config;
use crate::error::{Error, Result};

/// Driver name reported to the server during the handshake.
pub const DRIVER_NAME: &str = "docdb-rust";

/// Build the `hello` command a new connection sends first.
///
/// Carries driver and platform metadata; mechanisms may amend it during
/// [`AuthProvider::prepare`] before the connection submits it.
#[must_use]
pub fn handshake_command(config: &Config) -> Document {
    let mut client = doc! {
        "driver": {
            "name": DRIVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "os": {
            "type": std::env::consts::OS,
            "architecture": std::env::consts::ARCH,
        },
    };
    if let Some(name) = &config.app_name {
        client.insert("application", doc! { "name": name });
    }
    doc! { "hello": 1_i32, "client": client }
}

/// Authenticate `channel` using the mechanism configured in `config`.
///
/// Fails before any server round trip when `config` carries no credentials
/// or names a mechanism this build cannot drive. Returns the server's final
/// reply on success.
pub async fn authenticate(channel: &mut dyn CommandChannel, config: &Config) -> Result<Document> {
    let Some(credentials) = &config.credentials else {
        return Err(Error::Authentication(AuthError::Configuration(
            "connection must specify: credentials".to_string(),
        )));
    };
    let mut provider = provider_for(credentials)?;
    authenticate_with(provider.as_mut(), channel, config).await
}

/// Authenticate with an explicit provider instance.
///
/// Runs the provider's two-phase lifecycle: `prepare` with a fresh handshake
/// document, then the mechanism conversation. The provider must be freshly
/// constructed; providers are single-use.
pub async fn authenticate_with(
    provider: &mut dyn AuthProvider,
    channel: &mut dyn CommandChannel,
    config: &Config,
) -> Result<Document> {
    let handshake = handshake_command(config);
    let mut ctx = AuthContext::new(config.address(), config.credentials.clone(), channel);

    // The amended handshake belongs to the owning connection's open
    // sequence; authentication only needs the conversation that follows.
    let _ = provider.prepare(handshake, &ctx).await?;

    tracing::debug!(
        mechanism = provider.mechanism().as_str(),
        address = %config.address(),
        "starting authentication conversation"
    );
    let reply = provider.auth(&mut ctx).await?;
    Ok(reply)
}
