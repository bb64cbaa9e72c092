//! Identity introspection for the dashboards

use axum::Json;
use serde::Serialize;
use shared::models::{PermissionSet, Role, StaffRole};

use crate::auth::Principal;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_role: Option<StaffRole>,
    /// Effective staff permissions; admins and customers get an empty list
    pub permissions: PermissionSet,
    pub explicit_permissions: bool,
}

/// GET /api/me
pub async fn me(principal: Principal) -> Json<MeResponse> {
    Json(MeResponse {
        permissions: principal.effective_permissions().clone(),
        explicit_permissions: principal.grants.is_explicit(),
        id: principal.id,
        role: principal.role,
        shop_id: principal.shop_id,
        staff_role: principal.staff_role,
    })
}
