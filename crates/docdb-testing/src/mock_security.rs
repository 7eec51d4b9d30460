//! Scripted security backends for unit testing.
//!
//! [`ScriptedSecurity`] stands in for a Kerberos library: token exchanges
//! follow a configured script, and every call is journaled so tests can
//! assert on what the negotiation engine actually asked for.
//! [`ScriptedResolver`] does the same for hostname canonicalization.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docdb_auth::{
    ExplicitIdentity, HostResolver, ResolverError, SecurityContext, SecurityContextProvider,
    SecurityError,
};

/// Journal of every call a scripted security backend served.
#[derive(Debug, Default)]
pub struct SecurityJournal {
    /// Principals passed to `initialize`, in order.
    pub initialized_principals: Vec<String>,
    /// Explicit identities passed to `initialize`, as (username, password).
    pub explicit_identities: Vec<(String, String)>,
    /// Challenges passed to `step`, including the initial empty one.
    pub step_calls: Vec<Vec<u8>>,
    /// Messages passed to `unwrap`.
    pub unwrap_calls: Vec<Vec<u8>>,
    /// Messages and authorization users passed to `wrap`.
    pub wrap_calls: Vec<(Vec<u8>, Option<String>)>,
}

/// Scripted [`SecurityContextProvider`].
///
/// The default configuration is a fully cooperative backend: available,
/// contexts initialize, and every operation succeeds with fixed tokens.
/// Builder methods inject failures at each seam.
#[derive(Debug, Default)]
pub struct ScriptedSecurity {
    unavailable: Option<SecurityError>,
    initialize_failure: Option<SecurityError>,
    step_outcomes: Mutex<VecDeque<Result<Vec<u8>, SecurityError>>>,
    unwrap_failure: Option<SecurityError>,
    wrap_failure: Option<SecurityError>,
    journal: Arc<Mutex<SecurityJournal>>,
}

impl ScriptedSecurity {
    /// A backend where everything succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports the backend as unavailable from `ensure_available`.
    #[must_use]
    pub fn with_unavailable(mut self, message: impl Into<String>) -> Self {
        self.unavailable = Some(SecurityError::new(message));
        self
    }

    /// Fails `initialize` after journaling the request.
    #[must_use]
    pub fn with_initialize_failure(mut self, message: impl Into<String>) -> Self {
        self.initialize_failure = Some(SecurityError::new(message));
        self
    }

    /// Scripts the outcome of each `step` call in order. Once the script
    /// runs out, further calls succeed with a fixed token.
    #[must_use]
    pub fn with_step_outcomes(
        self,
        outcomes: impl IntoIterator<Item = Result<Vec<u8>, SecurityError>>,
    ) -> Self {
        Self {
            step_outcomes: Mutex::new(outcomes.into_iter().collect()),
            ..self
        }
    }

    /// Fails every `unwrap` call.
    #[must_use]
    pub fn with_unwrap_failure(mut self, message: impl Into<String>) -> Self {
        self.unwrap_failure = Some(SecurityError::new(message));
        self
    }

    /// Fails every `wrap` call.
    #[must_use]
    pub fn with_wrap_failure(mut self, message: impl Into<String>) -> Self {
        self.wrap_failure = Some(SecurityError::new(message));
        self
    }

    /// Handle on the call journal. Clone this before handing the backend
    /// to an authenticator.
    #[must_use]
    pub fn journal(&self) -> Arc<Mutex<SecurityJournal>> {
        Arc::clone(&self.journal)
    }
}

#[async_trait]
impl SecurityContextProvider for ScriptedSecurity {
    fn ensure_available(&self) -> Result<(), SecurityError> {
        match &self.unavailable {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn initialize(
        &self,
        principal: &str,
        identity: Option<ExplicitIdentity<'_>>,
    ) -> Result<Box<dyn SecurityContext>, SecurityError> {
        {
            let mut journal = self.journal.lock().await;
            journal.initialized_principals.push(principal.to_string());
            if let Some(identity) = identity {
                journal
                    .explicit_identities
                    .push((identity.username.to_string(), identity.password.to_string()));
            }
        }
        if let Some(error) = &self.initialize_failure {
            return Err(error.clone());
        }
        let outcomes = std::mem::take(&mut *self.step_outcomes.lock().await);
        Ok(Box::new(ScriptedContext {
            outcomes,
            unwrap_failure: self.unwrap_failure.clone(),
            wrap_failure: self.wrap_failure.clone(),
            journal: Arc::clone(&self.journal),
        }))
    }
}

struct ScriptedContext {
    outcomes: VecDeque<Result<Vec<u8>, SecurityError>>,
    unwrap_failure: Option<SecurityError>,
    wrap_failure: Option<SecurityError>,
    journal: Arc<Mutex<SecurityJournal>>,
}

#[async_trait]
impl SecurityContext for ScriptedContext {
    async fn step(&mut self, challenge: &[u8]) -> Result<Vec<u8>, SecurityError> {
        self.journal.lock().await.step_calls.push(challenge.to_vec());
        match self.outcomes.pop_front() {
            Some(outcome) => outcome,
            None => Ok(b"client-token".to_vec()),
        }
    }

    async fn unwrap(&mut self, message: &[u8]) -> Result<Vec<u8>, SecurityError> {
        self.journal.lock().await.unwrap_calls.push(message.to_vec());
        match &self.unwrap_failure {
            Some(error) => Err(error.clone()),
            None => Ok(b"unwrapped".to_vec()),
        }
    }

    async fn wrap(&mut self, message: &[u8], user: Option<&str>) -> Result<Vec<u8>, SecurityError> {
        self.journal
            .lock()
            .await
            .wrap_calls
            .push((message.to_vec(), user.map(str::to_string)));
        match &self.wrap_failure {
            Some(error) => Err(error.clone()),
            None => Ok(b"wrapped".to_vec()),
        }
    }
}

/// Outcome a [`ScriptedResolver`] serves for every lookup.
#[derive(Debug, Clone)]
pub enum ResolverOutcome {
    /// Canonical names, most specific first.
    Names(Vec<String>),
    /// The lookup itself fails.
    Failure(String),
}

/// Scripted [`HostResolver`] that records every lookup.
#[derive(Debug)]
pub struct ScriptedResolver {
    outcome: ResolverOutcome,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl ScriptedResolver {
    /// Resolves every host to the given canonical names.
    #[must_use]
    pub fn resolving<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outcome: ResolverOutcome::Names(names.into_iter().map(Into::into).collect()),
            lookups: Arc::default(),
        }
    }

    /// Lookups succeed but find nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::resolving(Vec::<String>::new())
    }

    /// Every lookup fails with the given message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: ResolverOutcome::Failure(message.into()),
            lookups: Arc::default(),
        }
    }

    /// Handle on the recorded lookups. Clone this before handing the
    /// resolver to an authenticator.
    #[must_use]
    pub fn lookups(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.lookups)
    }
}

#[async_trait]
impl HostResolver for ScriptedResolver {
    async fn canonical_names(&self, host: &str) -> Result<Vec<String>, ResolverError> {
        self.lookups.lock().await.push(host.to_string());
        match &self.outcome {
            ResolverOutcome::Names(names) => Ok(names.clone()),
            ResolverOutcome::Failure(message) => Err(ResolverError::new(message.clone())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_backend_cooperates() {
        let security = ScriptedSecurity::new();
        let journal = security.journal();

        assert!(security.ensure_available().is_ok());
        let mut context = security.initialize("mongodb@db.example.com", None).await.unwrap();
        let token = context.step(&[]).await.unwrap();
        assert_eq!(token, b"client-token");

        let journal = journal.lock().await;
        assert_eq!(journal.initialized_principals, ["mongodb@db.example.com"]);
        assert_eq!(journal.step_calls, [Vec::<u8>::new()]);
        assert!(journal.explicit_identities.is_empty());
    }

    #[tokio::test]
    async fn test_step_script_then_default() {
        let security = ScriptedSecurity::new().with_step_outcomes([
            Ok(b"first".to_vec()),
            Err(SecurityError::new("transient")),
        ]);
        let mut context = security.initialize("mongodb@h", None).await.unwrap();

        assert_eq!(context.step(&[]).await.unwrap(), b"first");
        assert!(context.step(b"challenge").await.is_err());
        assert_eq!(context.step(b"challenge").await.unwrap(), b"client-token");
    }

    #[tokio::test]
    async fn test_resolver_records_lookups() {
        let resolver = ScriptedResolver::resolving(["canonical.example.com"]);
        let lookups = resolver.lookups();

        let names = resolver.canonical_names("alias.example.com").await.unwrap();
        assert_eq!(names, ["canonical.example.com"]);
        assert_eq!(*lookups.lock().await, ["alias.example.com"]);

        assert!(ScriptedResolver::empty()
            .canonical_names("h")
            .await
            .unwrap()
            .is_empty());
        assert!(ScriptedResolver::failing("NXDOMAIN")
            .canonical_names("h")
            .await
            .is_err());
    }
}
