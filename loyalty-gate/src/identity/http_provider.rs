//! REST client for the managed user directory (no SDK dependency)

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

use super::{
    IdentityError, IdentityProvider, PasswordResetConfirm, PasswordResetRequest, SignInRequest,
    SignInResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, IdentityError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::InvalidCredentials)
            }
            s if s.is_client_error() => Err(IdentityError::Rejected(upstream_message(&text))),
            s => Err(IdentityError::Unavailable(format!("{path} returned {s}: {text}"))),
        }
    }
}

/// Pull `error` or `message` out of an upstream JSON body
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| "Request rejected by identity provider".to_string())
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, IdentityError> {
        let resp = self.post("/sign-in", request).await?;
        resp.json::<SignInResponse>()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Malformed sign-in response: {e}")))
    }

    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), IdentityError> {
        self.post("/password-reset", request).await.map(|_| ())
    }

    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirm,
    ) -> Result<(), IdentityError> {
        self.post("/password-reset/confirm", request).await.map(|_| ())
    }
}
