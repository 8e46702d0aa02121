//! Startup orchestration.
//!
//! # Responsibilities
//! - Run the identity handshake
//! - Attach the bearer token to the shared API client
//! - Install the route table and mount the application
//!
//! # Design Decisions
//! - Steps run in order; nothing is mounted before the handshake succeeds
//! - Failures are caught here once, logged, and leave the application unmounted
//! - No retry and no fallback route

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::http::{ApiClient, ApiError};
use crate::identity::{IdentityError, IdentityProvider};
use crate::lifecycle::mount::{Application, Mount, MountError};
use crate::observability::metrics;
use crate::routing::Router;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("authentication failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("could not attach credentials: {0}")]
    Credentials(#[from] ApiError),

    #[error(transparent)]
    Mount(#[from] MountError),
}

/// How a bootstrap ended.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// The application is mounted.
    Mounted { user: Option<String> },
    /// The provider answered but did not authenticate the user.
    NotAuthenticated,
    /// The handshake (or mounting) failed.
    Failed(BootstrapError),
}

impl BootstrapOutcome {
    pub fn is_mounted(&self) -> bool {
        matches!(self, BootstrapOutcome::Mounted { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            BootstrapOutcome::Mounted { .. } => "mounted",
            BootstrapOutcome::NotAuthenticated => "not_authenticated",
            BootstrapOutcome::Failed(_) => "failed",
        }
    }
}

/// Authenticate, attach the token to `api`, then mount the application on `target`.
pub async fn bootstrap<P, M>(
    provider: &P,
    api: &ApiClient,
    router: Arc<Router>,
    target: &mut M,
) -> BootstrapOutcome
where
    P: IdentityProvider,
    M: Mount,
{
    let start = Instant::now();
    let outcome = match run(provider, api, router, target).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Bootstrap failed, application not mounted");
            BootstrapOutcome::Failed(e)
        }
    };
    metrics::record_bootstrap(outcome.label(), start);
    outcome
}

async fn run<P, M>(
    provider: &P,
    api: &ApiClient,
    router: Arc<Router>,
    target: &mut M,
) -> Result<BootstrapOutcome, BootstrapError>
where
    P: IdentityProvider,
    M: Mount,
{
    // 1-2. Identity handshake
    let session = provider.init().await?;
    if !session.authenticated {
        tracing::warn!("Not authenticated, application not mounted");
        return Ok(BootstrapOutcome::NotAuthenticated);
    }

    // 3. Shared client credentials
    if let Some(token) = session.token.as_deref() {
        api.set_bearer_token(token)?;
        tracing::debug!(header = "Authorization", scheme = "Bearer", "Default credentials attached");
    }

    // 4-5. Router and mount
    let user = session.username().map(str::to_string);
    let app = Application::new(router, api.clone(), session);
    if let Err(e) = target.mount(app) {
        api.remove_default_header("authorization");
        return Err(e.into());
    }

    tracing::info!(user = user.as_deref().unwrap_or("anonymous"), "Bootstrap complete");
    Ok(BootstrapOutcome::Mounted { user })
}
