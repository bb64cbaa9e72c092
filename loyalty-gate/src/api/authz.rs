//! Policy decision endpoint
//!
//! Lets other platform routes ask "may this caller do X?" without linking
//! the authorization core themselves.

use axum::Json;
use serde::Serialize;
use shared::AppResult;

use crate::auth::{AccessCheck, Principal};
use crate::security_log;

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub allowed: bool,
    pub principal_id: String,
}

/// POST /api/authz/decide
///
/// 200 when allowed, otherwise the 401/403 error body with the code of the
/// failed check. Identity comes from the gateway headers like every other route.
pub async fn decide(
    principal: Principal,
    Json(check): Json<AccessCheck>,
) -> AppResult<Json<DecisionResponse>> {
    if !check.evaluate(&principal) {
        security_log!(
            INFO,
            "decision_denied",
            user_id = %principal.id,
            role = %principal.role,
            check = check.label()
        );
        return Err(check.denial());
    }

    Ok(Json(DecisionResponse {
        allowed: true,
        principal_id: principal.id,
    }))
}
