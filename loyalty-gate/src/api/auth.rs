//! Authentication proxy routes
//!
//! Each call is counted against `action:ip:email` before it reaches the
//! user directory. Every response carries the `X-RateLimit-*` headers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::AppError;

use crate::auth::{ClientIp, RateLimitKey, RateLimitPolicy, RateLimitStatus};
use crate::identity::{PasswordResetConfirm, PasswordResetRequest, SignInRequest};
use crate::security_log;
use crate::state::AppState;

pub const ACTION_LOGIN: &str = "login";
pub const ACTION_RESET_REQUEST: &str = "password_reset";
pub const ACTION_RESET_CONFIRM: &str = "password_reset_confirm";

fn require_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("A valid email is required"));
    }
    Ok(())
}

/// Count the attempt; `Err` carries the ready-made 429
fn throttle(
    state: &AppState,
    action: &'static str,
    ip: &str,
    email: &str,
    policy: RateLimitPolicy,
) -> Result<RateLimitStatus, Response> {
    let key = RateLimitKey::new(action, ip, email);
    let status = state.rate_limiter.check_policy(&key, policy);
    if status.allowed {
        return Ok(status);
    }

    security_log!(
        WARN,
        "rate_limited",
        action = action,
        ip = %ip,
        retry_after_secs = status.retry_after.as_secs()
    );
    Err(status.rejection())
}

fn with_limit_headers(mut response: Response, status: &RateLimitStatus) -> Response {
    status.apply_headers(response.headers_mut());
    response
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(request): Json<SignInRequest>,
) -> Response {
    if let Err(e) = require_email(&request.email) {
        return e.into_response();
    }
    let status = match throttle(
        &state,
        ACTION_LOGIN,
        &ip,
        &request.email,
        state.config.login_limit,
    ) {
        Ok(status) => status,
        Err(response) => return response,
    };

    let response = match state.identity.sign_in(&request).await {
        Ok(tokens) => Json(tokens).into_response(),
        Err(e) => {
            security_log!(INFO, "login_failed", ip = %ip, error = %e);
            AppError::from(e).into_response()
        }
    };
    with_limit_headers(response, &status)
}

/// POST /api/auth/password-reset
pub async fn request_password_reset(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(request): Json<PasswordResetRequest>,
) -> Response {
    if let Err(e) = require_email(&request.email) {
        return e.into_response();
    }
    let status = match throttle(
        &state,
        ACTION_RESET_REQUEST,
        &ip,
        &request.email,
        state.config.reset_request_limit,
    ) {
        Ok(status) => status,
        Err(response) => return response,
    };

    let response = match state.identity.request_password_reset(&request).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => AppError::from(e).into_response(),
    };
    with_limit_headers(response, &status)
}

/// POST /api/auth/password-reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(request): Json<PasswordResetConfirm>,
) -> Response {
    if let Err(e) = require_email(&request.email) {
        return e.into_response();
    }
    let status = match throttle(
        &state,
        ACTION_RESET_CONFIRM,
        &ip,
        &request.email,
        state.config.reset_confirm_limit,
    ) {
        Ok(status) => status,
        Err(response) => return response,
    };

    let response = match state.identity.confirm_password_reset(&request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => AppError::from(e).into_response(),
    };
    with_limit_headers(response, &status)
}
