//! Kerberos security contexts via libgssapi (`gssapi` feature).
//!
//! Implements [`SecurityContextProvider`] over MIT Kerberos. Every GSSAPI
//! call is blocking, so each one is moved onto the blocking pool; the
//! negotiation code above never stalls an async worker thread.
//!
//! ## Prerequisites
//!
//! - **Kerberos libraries**: libkrb5-dev (Debian/Ubuntu) or krb5-devel
//!   (RHEL/Fedora)
//! - **Valid Kerberos ticket**: run `kinit user@REALM` before connecting
//! - **Service principal**: the server's `<service>@<host>` principal must
//!   be registered with the KDC
//!
//! Explicit passwords are not supported by this backend; credentials come
//! from the ambient ticket cache.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use libgssapi::{
    context::{ClientCtx, CtxFlags, SecurityContext as GssContextOps},
    credential::{Cred, CredUsage},
    name::Name,
    oid::{GSS_MECH_KRB5, GSS_NT_HOSTBASED_SERVICE, OidSet},
};

use crate::security::{
    ExplicitIdentity, SecurityContext, SecurityContextProvider, SecurityError,
};

/// Security provider backed by MIT Kerberos through libgssapi.
///
/// Contexts request mutual authentication and sequence detection, which is
/// what the server-side SASL implementation expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Krb5ContextProvider;

impl Krb5ContextProvider {
    /// Creates the provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecurityContextProvider for Krb5ContextProvider {
    fn ensure_available(&self) -> Result<(), SecurityError> {
        // Linked in at build time; nothing to probe.
        Ok(())
    }

    async fn initialize(
        &self,
        principal: &str,
        identity: Option<ExplicitIdentity<'_>>,
    ) -> Result<Box<dyn SecurityContext>, SecurityError> {
        if identity.is_some() {
            return Err(SecurityError::new(
                "the libgssapi backend authenticates from the ticket cache; \
                 run kinit instead of configuring a password",
            ));
        }
        let principal = principal.to_string();
        let ctx = run_blocking(move || client_context(&principal)).await?;
        Ok(Box::new(Krb5Context {
            inner: Arc::new(Mutex::new(ctx)),
        }))
    }
}

/// Builds a GSSAPI client context for `principal` from the ticket cache.
fn client_context(principal: &str) -> Result<ClientCtx, SecurityError> {
    let service_name = Name::new(principal.as_bytes(), Some(&GSS_NT_HOSTBASED_SERVICE))
        .map_err(|e| SecurityError::new(format!("failed to create service name: {e}")))?;

    let mut mechs =
        OidSet::new().map_err(|e| SecurityError::new(format!("failed to create OID set: {e}")))?;
    mechs
        .add(&GSS_MECH_KRB5)
        .map_err(|e| SecurityError::new(format!("failed to add Kerberos mechanism: {e}")))?;

    let cred = Cred::acquire(None, None, CredUsage::Initiate, Some(&mechs))
        .map_err(|e| SecurityError::new(format!("failed to acquire credentials: {e}")))?;

    Ok(ClientCtx::new(
        Some(cred),
        service_name,
        CtxFlags::GSS_C_MUTUAL_FLAG | CtxFlags::GSS_C_SEQUENCE_FLAG,
        Some(&GSS_MECH_KRB5),
    ))
}

struct Krb5Context {
    inner: Arc<Mutex<ClientCtx>>,
}

fn lock(inner: &Arc<Mutex<ClientCtx>>) -> Result<MutexGuard<'_, ClientCtx>, SecurityError> {
    inner
        .lock()
        .map_err(|_| SecurityError::new("failed to acquire context lock"))
}

async fn run_blocking<T, F>(f: F) -> Result<T, SecurityError>
where
    F: FnOnce() -> Result<T, SecurityError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SecurityError::new(format!("kerberos task failed: {e}")))?
}

#[async_trait]
impl SecurityContext for Krb5Context {
    async fn step(&mut self, challenge: &[u8]) -> Result<Vec<u8>, SecurityError> {
        let inner = Arc::clone(&self.inner);
        let challenge = challenge.to_vec();
        run_blocking(move || {
            let mut guard = lock(&inner)?;
            let token = if challenge.is_empty() {
                guard.step(None, None)
            } else {
                guard.step(Some(&challenge), None)
            };
            match token {
                Ok(Some(token)) => Ok(token.to_vec()),
                Ok(None) => Ok(Vec::new()),
                Err(e) => Err(SecurityError::new(format!("GSSAPI step failed: {e}"))),
            }
        })
        .await
    }

    async fn unwrap(&mut self, message: &[u8]) -> Result<Vec<u8>, SecurityError> {
        let inner = Arc::clone(&self.inner);
        let message = message.to_vec();
        run_blocking(move || {
            let mut guard = lock(&inner)?;
            guard
                .unwrap(&message)
                .map(|buf| buf.to_vec())
                .map_err(|e| SecurityError::new(format!("GSSAPI unwrap failed: {e}")))
        })
        .await
    }

    async fn wrap(&mut self, message: &[u8], user: Option<&str>) -> Result<Vec<u8>, SecurityError> {
        let inner = Arc::clone(&self.inner);
        // SASL security-layer confirmation: the authorization identity is
        // appended to the plaintext before wrapping.
        let mut plain = message.to_vec();
        if let Some(user) = user {
            plain.extend_from_slice(user.as_bytes());
        }
        run_blocking(move || {
            let mut guard = lock(&inner)?;
            guard
                .wrap(false, &plain)
                .map(|buf| buf.to_vec())
                .map_err(|e| SecurityError::new(format!("GSSAPI wrap failed: {e}")))
        })
        .await
    }
}

// Note: Krb5Context is not Clone because GSSAPI contexts are stateful and
// cannot be cloned. Each authentication attempt gets its own context.
