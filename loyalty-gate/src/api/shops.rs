//! Shop-scoped access summary

use axum::{Json, extract::Path};
use serde::Serialize;
use shared::models::Permission;

use crate::auth::{Principal, access};

#[derive(Debug, Serialize)]
pub struct ShopAccessResponse {
    pub shop_id: String,
    pub can_access: bool,
    pub can_modify: bool,
    /// Permissions the caller holds in this shop
    pub permissions: Vec<Permission>,
}

/// GET /api/shops/{shop_id}/access
///
/// Mounted behind `require_shop_access`, so `can_access` is always true
/// here; the dashboards use the rest to decide which controls to show.
pub async fn shop_access(
    principal: Principal,
    Path(shop_id): Path<String>,
) -> Json<ShopAccessResponse> {
    let permissions = Permission::ALL
        .into_iter()
        .filter(|&p| access::has_permission(&principal, p, Some(&shop_id)))
        .collect();

    Json(ShopAccessResponse {
        can_access: access::can_access_shop(&principal, &shop_id),
        can_modify: access::can_modify_shop(&principal, &shop_id),
        permissions,
        shop_id,
    })
}
