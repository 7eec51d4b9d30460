//! GSSAPI (Kerberos) authentication.
//!
//! Runs the GSSAPI SASL conversation against the `$external` database. The
//! Kerberos work itself is delegated to an injected
//! [`SecurityContextProvider`]; this module owns sequencing, validation,
//! retry policy, and error mapping.
//!
//! ## How it works
//!
//! Authentication is exactly three command round trips:
//!
//! 1. `saslStart` carrying the client's initial token. The server replies
//!    with a challenge and assigns a conversation id that every later
//!    command and reply must carry.
//! 2. `saslContinue` carrying the answer to the server's challenge. A
//!    transient failure while computing the answer is retried with the
//!    same challenge, up to a budget.
//! 3. `saslContinue` carrying the security-layer confirmation: the
//!    server's message is unwrapped, then wrapped back tagged with the
//!    authorization identity.
//!
//! The final server reply is returned to the caller verbatim.
//!
//! ## Prerequisites
//!
//! - A security backend (enable the `gssapi` feature for the libgssapi
//!   one, or inject your own provider).
//! - A service principal reachable as `<service>@<host>`; the service name
//!   defaults to `mongodb` and comes from mechanism properties otherwise.
//! - Credentials for the principal, usually a Kerberos ticket cache.

use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use bytes::Bytes;
use tracing::{debug, trace};

use docdb_protocol::{CommandReply, ProtocolError, SaslCommand};

use crate::credentials::EXTERNAL_SOURCE;
use crate::error::AuthError;
use crate::properties;
use crate::provider::{AuthContext, AuthMechanism, AuthProvider};
use crate::resolver::{HostResolver, ResolverError};
use crate::security::{ExplicitIdentity, SecurityContext, SecurityContextProvider};

/// Default budget of additional challenge-step attempts after the first.
pub const DEFAULT_STEP_RETRIES: u32 = 10;

/// Default separator between service name and host in the principal.
pub const DEFAULT_PRINCIPAL_SEPARATOR: char = '@';

/// Where an authentication attempt currently stands.
///
/// States advance monotonically; any failure moves to `Failed` and the
/// attempt cannot be resumed.
#[derive(Debug, Clone)]
pub enum NegotiationState {
    /// Nothing has happened yet.
    Uninitialized,
    /// Configuration was validated and a security context exists (or is
    /// being created); no command has been sent.
    ContextInitializing,
    /// `saslStart` was sent; waiting on the server's challenge.
    AwaitingServerChallenge,
    /// The challenge was answered; negotiating the security layer.
    NegotiatingSecurityLayer,
    /// The security-layer confirmation is in flight.
    Finalizing,
    /// The server accepted the conversation.
    Authenticated,
    /// The attempt failed with the recorded error.
    Failed(Box<AuthError>),
}

impl NegotiationState {
    /// Whether the attempt ended successfully.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Whether the attempt ended in failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// GSSAPI authentication provider.
///
/// One instance drives one authentication attempt on one connection:
/// [`prepare`](AuthProvider::prepare) validates configuration and creates
/// the security context, [`auth`](AuthProvider::auth) runs the
/// conversation. The security context is dropped as soon as the attempt
/// finishes, in either direction.
pub struct GssapiAuthenticator {
    provider: Arc<dyn SecurityContextProvider>,
    resolver: Option<Arc<dyn HostResolver>>,
    separator: char,
    step_retries: u32,
    state: NegotiationState,
    principal: Option<String>,
    conversation_id: Option<i32>,
    context: Option<Box<dyn SecurityContext>>,
}

impl GssapiAuthenticator {
    /// Creates an authenticator over the given security backend.
    #[must_use]
    pub fn new(provider: Arc<dyn SecurityContextProvider>) -> Self {
        Self {
            provider,
            resolver: None,
            separator: DEFAULT_PRINCIPAL_SEPARATOR,
            step_retries: DEFAULT_STEP_RETRIES,
            state: NegotiationState::Uninitialized,
            principal: None,
            conversation_id: None,
            context: None,
        }
    }

    /// Creates an authenticator over the build's default backend: the
    /// libgssapi one when the `gssapi` feature is enabled, otherwise a
    /// stub that reports Kerberos as unavailable.
    #[must_use]
    pub fn with_default_provider() -> Self {
        #[cfg(feature = "gssapi")]
        let provider: Arc<dyn SecurityContextProvider> =
            Arc::new(crate::krb5::Krb5ContextProvider::new());
        #[cfg(not(feature = "gssapi"))]
        let provider: Arc<dyn SecurityContextProvider> = Arc::new(crate::security::MissingKerberos);
        Self::new(provider)
    }

    /// Sets the resolver used when hostname canonicalization is requested.
    ///
    /// Without one, a conversation that asks for canonicalization fails
    /// with a host resolution error.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Overrides the separator between service name and host in the
    /// service principal.
    #[must_use]
    pub fn with_principal_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Overrides the challenge-step retry budget.
    #[must_use]
    pub fn with_step_retries(mut self, retries: u32) -> Self {
        self.step_retries = retries;
        self
    }

    /// Current state of the attempt.
    #[must_use]
    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    /// The service principal composed during `prepare`, once available.
    #[must_use]
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Records a failure in the state machine and hands the error back for
    /// returning. The security context, if still held, is released.
    fn fail(&mut self, error: AuthError) -> AuthError {
        self.context = None;
        self.state = NegotiationState::Failed(Box::new(error.clone()));
        error
    }

    /// One command round trip on the conversation: run against
    /// `$external`, demand success, and pin or verify the conversation id.
    async fn round_trip(
        &mut self,
        ctx: &mut AuthContext<'_>,
        command: Document,
    ) -> Result<(i32, CommandReply), AuthError> {
        let reply = match ctx.channel.run_command(EXTERNAL_SOURCE, command).await {
            Ok(document) => CommandReply::new(document),
            Err(transport) => return Err(self.fail(AuthError::Transport(transport))),
        };
        if let Err(failure) = reply.check() {
            return Err(self.fail(AuthError::Protocol(failure)));
        }
        let received = match reply.conversation_id() {
            Ok(id) => id,
            Err(failure) => return Err(self.fail(AuthError::Protocol(failure))),
        };
        match self.conversation_id {
            Some(started) if started != received => {
                Err(self.fail(AuthError::Protocol(ProtocolError::ConversationIdMismatch {
                    started,
                    received,
                })))
            }
            Some(_) => Ok((received, reply)),
            None => {
                self.conversation_id = Some(received);
                Ok((received, reply))
            }
        }
    }
}

impl std::fmt::Debug for GssapiAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GssapiAuthenticator")
            .field("state", &self.state)
            .field("principal", &self.principal)
            .field("step_retries", &self.step_retries)
            .field("context_held", &self.context.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for GssapiAuthenticator {
    fn mechanism(&self) -> AuthMechanism {
        AuthMechanism::Gssapi
    }

    async fn prepare(
        &mut self,
        handshake: Document,
        ctx: &AuthContext<'_>,
    ) -> Result<Document, AuthError> {
        if !matches!(self.state, NegotiationState::Uninitialized) {
            return Err(self.fail(AuthError::Configuration(
                "GSSAPI authenticator already used; one instance drives one attempt".to_string(),
            )));
        }

        let (host, _port, credentials) = match ctx.connection_fields() {
            Ok(fields) => fields,
            Err(failure) => return Err(self.fail(failure)),
        };

        if let Err(reason) = self.provider.ensure_available() {
            return Err(self.fail(AuthError::KerberosUnavailable(reason.to_string())));
        }

        let service_name =
            properties::service_name(&credentials.mechanism_properties).to_string();
        let canonicalize =
            properties::canonicalize_host_name(&credentials.mechanism_properties);

        let service_host = if canonicalize {
            let Some(resolver) = self.resolver.clone() else {
                return Err(self.fail(AuthError::HostResolution {
                    host: host.to_string(),
                    source: ResolverError::new(
                        "hostname canonicalization requested but no resolver is configured",
                    ),
                }));
            };
            match resolver.canonical_names(host).await {
                Ok(names) => match names.into_iter().next() {
                    Some(canonical) => {
                        debug!(configured = host, canonical = %canonical,
                            "canonicalized GSSAPI service host");
                        canonical
                    }
                    None => {
                        debug!(configured = host,
                            "canonical name lookup returned nothing; keeping configured host");
                        host.to_string()
                    }
                },
                Err(source) => {
                    return Err(self.fail(AuthError::HostResolution {
                        host: host.to_string(),
                        source,
                    }));
                }
            }
        } else {
            host.to_string()
        };

        let principal = format!("{}{}{}", service_name, self.separator, service_host);
        self.principal = Some(principal.clone());
        self.state = NegotiationState::ContextInitializing;

        let identity = credentials
            .password
            .as_deref()
            .map(|password| ExplicitIdentity {
                username: credentials.username.as_str(),
                password,
            });

        let provider = Arc::clone(&self.provider);
        let context = match provider.initialize(&principal, identity).await {
            Ok(context) => context,
            Err(reason) => return Err(self.fail(AuthError::SecurityInit(reason))),
        };
        self.context = Some(context);
        debug!(principal = %principal, explicit_identity = identity.is_some(),
            "initialized GSSAPI security context");

        Ok(handshake)
    }

    async fn auth(&mut self, ctx: &mut AuthContext<'_>) -> Result<Document, AuthError> {
        if !matches!(self.state, NegotiationState::ContextInitializing) {
            return Err(self.fail(AuthError::Configuration(
                "GSSAPI conversation started before prepare completed".to_string(),
            )));
        }
        let username = match ctx.credentials.as_ref() {
            Some(credentials) => credentials.username.clone(),
            None => {
                return Err(
                    self.fail(AuthError::Configuration("credentials required".to_string()))
                );
            }
        };
        let Some(mut context) = self.context.take() else {
            return Err(self.fail(AuthError::Configuration(
                "security context missing after prepare".to_string(),
            )));
        };

        // Round 1: saslStart with the client's initial token.
        let initial = match context.step(&[]).await {
            Ok(token) => token,
            Err(reason) => {
                return Err(self.fail(AuthError::SecurityNegotiation {
                    attempts: 1,
                    source: reason,
                }));
            }
        };
        debug!(token_len = initial.len(), "starting GSSAPI SASL conversation");
        let start = SaslCommand::start(AuthMechanism::Gssapi.as_str(), Bytes::from(initial));
        self.state = NegotiationState::AwaitingServerChallenge;
        let (conversation_id, reply) = self.round_trip(ctx, start.to_document()).await?;
        let challenge = match reply.payload() {
            Ok(payload) => payload,
            Err(failure) => return Err(self.fail(failure.into())),
        };

        // Round 2: answer the server's challenge. Failures here are often
        // transient (ticket refresh races, clock skew at the margin), so
        // the same challenge is retried up to the budget.
        let mut attempts: u32 = 0;
        let response = loop {
            attempts += 1;
            match context.step(&challenge).await {
                Ok(token) => break token,
                Err(reason) if attempts <= self.step_retries => {
                    debug!(attempt = attempts, budget = self.step_retries, error = %reason,
                        "GSSAPI challenge step failed; retrying with the same challenge");
                }
                Err(reason) => {
                    return Err(self.fail(AuthError::SecurityNegotiation {
                        attempts,
                        source: reason,
                    }));
                }
            }
        };
        trace!(attempts, response_len = response.len(), "GSSAPI challenge answered");
        let proceed = SaslCommand::continue_with(conversation_id, Bytes::from(response));
        let (_, reply) = self.round_trip(ctx, proceed.to_document()).await?;
        let final_challenge = match reply.payload() {
            Ok(payload) => payload,
            Err(failure) => return Err(self.fail(failure.into())),
        };
        self.state = NegotiationState::NegotiatingSecurityLayer;

        // Round 3: unwrap the server's security-layer message and wrap it
        // back tagged with the authorization identity.
        let unwrapped = match context.unwrap(&final_challenge).await {
            Ok(message) => message,
            Err(reason) => {
                return Err(self.fail(AuthError::SecurityNegotiation {
                    attempts: 1,
                    source: reason,
                }));
            }
        };
        let wrapped = match context.wrap(&unwrapped, Some(&username)).await {
            Ok(message) => message,
            Err(reason) => {
                return Err(self.fail(AuthError::SecurityNegotiation {
                    attempts: 1,
                    source: reason,
                }));
            }
        };
        self.state = NegotiationState::Finalizing;
        let finish = SaslCommand::continue_with(conversation_id, Bytes::from(wrapped));
        let (_, reply) = self.round_trip(ctx, finish.to_document()).await?;

        self.state = NegotiationState::Authenticated;
        debug!(conversation_id, "GSSAPI SASL conversation complete");
        Ok(reply.into_document())
    }
}
