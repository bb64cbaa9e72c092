//! Application-layer rate limiting for login and password-reset routes
//!
//! Fixed-window counters keyed by `action:ip:identity`. The map lives in
//! this process only: with several instances behind a load balancer each one
//! enforces its own budget, so a global bound needs a shared counter store.

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shared::error::{AppError, ErrorBody};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const HEADER_RETRY_AFTER: &str = "retry-after";
pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Longest window a policy may use; longer windows are clamped
pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

struct Entry {
    count: u32,
    reset_at: Instant,
}

/// Attempt budget for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }
}

/// Result of one [`RateLimiter::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Wall-clock end of the current window
    pub reset_at: DateTime<Utc>,
    /// Time left in the current window
    pub retry_after: Duration,
}

impl RateLimitStatus {
    /// Write the `X-RateLimit-*` headers (and `Retry-After` when rejected)
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(HEADER_LIMIT, HeaderValue::from(self.limit));
        headers.insert(HEADER_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(HEADER_RESET, HeaderValue::from(self.reset_at.timestamp()));
        if !self.allowed {
            // Round up so clients never retry a hair too early
            let secs = self.retry_after.as_secs() + u64::from(self.retry_after.subsec_nanos() > 0);
            headers.insert(HEADER_RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
    }

    /// 429 response for a rejected attempt
    pub fn rejection(&self) -> Response {
        let body = ErrorBody::from(&AppError::too_many_attempts());
        let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
        self.apply_headers(response.headers_mut());
        response
    }
}

/// Composite limiter key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    /// `action:ip:identity`; the identity is trimmed and lower-cased so
    /// `Alice@Example.com ` and `alice@example.com` share a budget
    pub fn new(action: &str, ip: &str, identity: &str) -> Self {
        Self(format!(
            "{action}:{ip}:{}",
            identity.trim().to_lowercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fixed-window attempt counter
///
/// Cheap to clone; clones share the same counters.
#[derive(Clone, Default)]
pub struct RateLimiter {
    inner: Arc<DashMap<String, Entry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an attempt for `key` against `limit` per `window`
    pub fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitStatus {
        self.check_at(key, limit, window, Instant::now())
    }

    /// [`check`](Self::check) with an explicit clock reading
    pub fn check_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> RateLimitStatus {
        // The entry guard holds the shard lock: read-modify-write is atomic per key
        let mut entry = self.inner.entry(key.to_owned()).or_insert_with(|| Entry {
            count: 0,
            reset_at: now,
        });

        if now >= entry.reset_at {
            entry.count = 1;
            entry.reset_at = window_end(now, window);
        } else {
            entry.count = entry.count.saturating_add(1);
        }

        let count = entry.count;
        let retry_after = entry.reset_at.saturating_duration_since(now);
        drop(entry);

        RateLimitStatus {
            allowed: count <= limit,
            limit,
            remaining: limit.saturating_sub(count),
            reset_at: wall_clock_after(retry_after),
            retry_after,
        }
    }

    /// [`check`](Self::check) with a policy
    pub fn check_policy(&self, key: &RateLimitKey, policy: RateLimitPolicy) -> RateLimitStatus {
        self.check(key.as_str(), policy.limit, policy.window)
    }

    /// Drop records whose window has ended
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.reset_at > now);
        before.saturating_sub(self.inner.len())
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Run [`sweep`](Self::sweep) every `interval` on the current runtime
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    tracing::debug!(removed, remaining = limiter.len(), "Rate limiter sweep");
                }
            }
        })
    }
}

/// `now + window`, clamped to [`MAX_WINDOW`] and never overflowing
fn window_end(now: Instant, window: Duration) -> Instant {
    let mut window = window.min(MAX_WINDOW);
    loop {
        if let Some(end) = now.checked_add(window) {
            return end;
        }
        window /= 2;
    }
}

fn wall_clock_after(delay: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Client IP extractor for handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(&parts.headers, &parts.extensions)))
    }
}

/// Client IP: X-Forwarded-For header first (gateway), then peer address
pub fn client_ip(headers: &HeaderMap, extensions: &http::Extensions) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // X-Forwarded-For can be comma-separated; first entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    extensions
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}
