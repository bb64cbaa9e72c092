//! Application state for the gate server

use shared::{AppError, AppResult};
use std::sync::Arc;

use crate::auth::rate_limit::RateLimiter;
use crate::auth::{HeaderIdentity, SessionResolver};
use crate::config::Config;
use crate::identity::{HttpIdentityProvider, IdentityProvider};


/// Shared application state
///
/// Built once at process start and handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Resolves identity metadata for each request
    pub sessions: Arc<dyn SessionResolver>,
    /// Managed user directory
    pub identity: Arc<dyn IdentityProvider>,
    /// Attempt counters for authentication routes (per process)
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Production wiring: gateway headers + HTTP identity provider
    pub fn new(config: &Config) -> AppResult<Self> {
        let identity = HttpIdentityProvider::new(config.identity_provider_url.as_str())
            .map_err(|e| AppError::config(format!("Identity provider client: {e}")))?;
        Ok(Self::with_parts(
            config.clone(),
            Arc::new(HeaderIdentity),
            Arc::new(identity),
        ))
    }

    /// Explicit wiring, used by tests and alternative session backends
    pub fn with_parts(
        config: Config,
        sessions: Arc<dyn SessionResolver>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            identity,
            rate_limiter: RateLimiter::new(),
        }
    }
}
