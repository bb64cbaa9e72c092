//! Principal Extractor
//!
//! Lets handlers take a [`Principal`] argument directly.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::AppError;

use crate::auth::{AccessCheck, Principal, Rejection, authorize};
use crate::security_log;
use crate::state::AppState;

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth`
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let metadata = state.sessions.resolve(parts).await;
        match authorize(metadata, &AccessCheck::Authenticated) {
            Ok(principal) => {
                parts.extensions.insert(principal.clone());
                Ok(principal)
            }
            Err(rejection) => {
                let event = match rejection {
                    Rejection::Unauthenticated => "auth_missing",
                    Rejection::Forbidden => "role_unrecognized",
                };
                security_log!(WARN, event, uri = %parts.uri);
                Err(rejection.into())
            }
        }
    }
}
