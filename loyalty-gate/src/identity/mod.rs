//! Identity provider client
//!
//! Sign-in and password reset are owned by the managed user directory. The
//! gate only throttles these calls and forwards them.

mod http_provider;

pub use http_provider::HttpIdentityProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use std::fmt;
use thiserror::Error;

/// Stands in for secrets in `Debug` output
const REDACTED: &str = "<redacted>";

#[derive(Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordResetConfirm {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

impl fmt::Debug for PasswordResetConfirm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordResetConfirm")
            .field("email", &self.email)
            .field("code", &REDACTED)
            .field("new_password", &REDACTED)
            .finish()
    }
}

/// Tokens issued by the directory, passed through untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignInResponse(pub serde_json::Value);

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidCredentials => AppError::new(ErrorCode::InvalidCredentials),
            IdentityError::Rejected(message) => AppError::invalid_request(message),
            IdentityError::Unavailable(message) => {
                tracing::error!(error = %message, "Identity provider call failed");
                AppError::new(ErrorCode::IdentityProviderError)
            }
        }
    }
}

/// Managed user directory
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, IdentityError>;

    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), IdentityError>;

    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirm,
    ) -> Result<(), IdentityError>;
}
