//! Gate server configuration

use std::time::Duration;

use shared::{AppError, AppResult};

use crate::auth::rate_limit::{MAX_WINDOW, RateLimitPolicy};

/// Gate server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// Base URL of the managed user directory
    pub identity_provider_url: String,
    /// Emit JSON logs instead of human-readable lines
    pub log_json: bool,
    /// How often expired rate-limit records are dropped
    pub rate_limit_sweep_interval: Duration,
    /// Sign-in attempts
    pub login_limit: RateLimitPolicy,
    /// Password reset code requests
    pub reset_request_limit: RateLimitPolicy,
    /// Password reset confirmations
    pub reset_confirm_limit: RateLimitPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            http_port: 8080,
            identity_provider_url: "http://localhost:9099".into(),
            log_json: false,
            rate_limit_sweep_interval: Duration::from_secs(60),
            login_limit: RateLimitPolicy::new(5, Duration::from_secs(60)),
            reset_request_limit: RateLimitPolicy::new(3, Duration::from_secs(15 * 60)),
            reset_confirm_limit: RateLimitPolicy::new(5, Duration::from_secs(15 * 60)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Positive number of seconds, capped at [`MAX_WINDOW`]
fn env_secs(name: &str) -> Option<Duration> {
    env_parse(name)
        .filter(|&secs: &u64| secs > 0)
        .map(|secs| Duration::from_secs(secs).min(MAX_WINDOW))
}

fn env_policy(limit_var: &str, window_var: &str, default: RateLimitPolicy) -> RateLimitPolicy {
    RateLimitPolicy {
        limit: env_parse(limit_var)
            .filter(|&limit: &u32| limit > 0)
            .unwrap_or(default.limit),
        window: env_secs(window_var).unwrap_or(default.window),
    }
}

/// The directory URL may only be defaulted in development
fn identity_provider_url(environment: &str, configured: Option<String>) -> AppResult<String> {
    match configured {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ if environment != "development" => Err(AppError::config(format!(
            "IDENTITY_PROVIDER_URL must be set in {environment} environment"
        ))),
        _ => Ok(Config::default().identity_provider_url),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unparseable numbers fall back to defaults. `IDENTITY_PROVIDER_URL` is
    /// required outside development.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let identity_provider_url =
            identity_provider_url(&environment, std::env::var("IDENTITY_PROVIDER_URL").ok())?;

        Ok(Self {
            http_port: env_parse("HTTP_PORT").unwrap_or(defaults.http_port),
            identity_provider_url,
            log_json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
            rate_limit_sweep_interval: env_secs("RATE_LIMIT_SWEEP_SECS")
                .unwrap_or(defaults.rate_limit_sweep_interval),
            login_limit: env_policy(
                "LOGIN_RATE_LIMIT",
                "LOGIN_RATE_WINDOW_SECS",
                defaults.login_limit,
            ),
            reset_request_limit: env_policy(
                "RESET_RATE_LIMIT",
                "RESET_RATE_WINDOW_SECS",
                defaults.reset_request_limit,
            ),
            reset_confirm_limit: env_policy(
                "RESET_CONFIRM_RATE_LIMIT",
                "RESET_CONFIRM_RATE_WINDOW_SECS",
                defaults.reset_confirm_limit,
            ),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
