//! Request authorization adapter
//!
//! Turns inbound identity metadata into a [`Principal`] and evaluates an
//! [`AccessCheck`] against it. Rejections are ordinary return values; this
//! module neither logs decisions nor rate-limits (callers compose that).
//!
//! # Trust boundary
//!
//! Identity headers are set by the gateway after the identity provider has
//! verified the caller. Nothing here checks signatures: the service must
//! never be reachable by clients that can set these headers themselves.

use async_trait::async_trait;
use http::HeaderMap;
use http::request::Parts;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Permission, PermissionSet, Role, StaffRole};

use super::access;
use super::principal::Principal;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_ROLE: &str = "x-user-role";
pub const HEADER_USER_SHOP_ID: &str = "x-user-shop-id";
pub const HEADER_USER_STAFF_ROLE: &str = "x-user-staff-role";
pub const HEADER_USER_PERMISSIONS: &str = "x-user-permissions";

/// Raw identity as it arrives, before any interpretation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMetadata {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub shop_id: Option<String>,
    pub staff_role: Option<String>,
    /// Serialized permission list (JSON array of identifiers)
    pub permissions: Option<String>,
}

/// Identity resolved by a session collaborator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionIdentity {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub staff_role: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl IdentityMetadata {
    /// Read the trusted gateway headers
    ///
    /// Empty or non-UTF-8 identity fields count as absent. A permissions
    /// header that is present but unreadable is kept as an empty string so it
    /// still overrides the staff-role default and parses to nothing.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        Self {
            user_id: get(HEADER_USER_ID),
            role: get(HEADER_USER_ROLE),
            shop_id: get(HEADER_USER_SHOP_ID),
            staff_role: get(HEADER_USER_STAFF_ROLE),
            permissions: headers.get(HEADER_USER_PERMISSIONS).map(|v| {
                v.to_str()
                    .map(|raw| raw.trim().to_owned())
                    .unwrap_or_default()
            }),
        }
    }

    pub fn from_session(session: SessionIdentity) -> Self {
        Self {
            user_id: Some(session.id).filter(|id| !id.is_empty()),
            role: Some(session.role),
            shop_id: session.shop_id.filter(|s| !s.is_empty()),
            staff_role: session.staff_role,
            permissions: session
                .permissions
                .and_then(|list| serde_json::to_string(&list).ok()),
        }
    }
}

/// Source of identity metadata for a request
///
/// Session lookups may suspend; header extraction does not.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, parts: &Parts) -> Option<IdentityMetadata>;
}

/// Reads the gateway identity headers
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderIdentity;

#[async_trait]
impl SessionResolver for HeaderIdentity {
    async fn resolve(&self, parts: &Parts) -> Option<IdentityMetadata> {
        let metadata = IdentityMetadata::from_headers(&parts.headers);
        (metadata != IdentityMetadata::default()).then_some(metadata)
    }
}

/// Parse a serialized permission list
///
/// Malformed input yields the empty set: the principal keeps its identity
/// but gains nothing. Unknown identifiers are skipped.
pub fn parse_permission_list(raw: &str) -> PermissionSet {
    let entries: Vec<String> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed permission list, treating as empty");
            return PermissionSet::new();
        }
    };

    entries
        .iter()
        .filter_map(|entry| match entry.parse::<Permission>() {
            Ok(permission) => Some(permission),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unknown permission");
                None
            }
        })
        .collect()
}

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// No usable identity (401)
    #[error("authentication required")]
    Unauthenticated,
    /// Identity present, check failed (403)
    #[error("forbidden")]
    Forbidden,
}

impl Rejection {
    pub fn status(&self) -> http::StatusCode {
        match self {
            Rejection::Unauthenticated => http::StatusCode::UNAUTHORIZED,
            Rejection::Forbidden => http::StatusCode::FORBIDDEN,
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Unauthenticated => AppError::new(ErrorCode::NotAuthenticated),
            Rejection::Forbidden => AppError::new(ErrorCode::PermissionDenied),
        }
    }
}

/// Build the principal, or reject when there is no identity to build from
pub fn resolve_principal(metadata: Option<IdentityMetadata>) -> Result<Principal, Rejection> {
    let metadata = metadata.ok_or(Rejection::Unauthenticated)?;
    let user_id = metadata.user_id.ok_or(Rejection::Unauthenticated)?;

    let role = metadata
        .role
        .as_deref()
        .map(Role::parse)
        .unwrap_or(Role::Unrecognized);
    let staff_role = metadata.staff_role.as_deref().map(StaffRole::parse);
    let explicit = metadata.permissions.as_deref().map(parse_permission_list);

    Ok(Principal::new(
        user_id,
        role,
        metadata.shop_id,
        staff_role,
        explicit,
    ))
}

/// Operation a route needs the principal to pass
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessCheck {
    /// Any recognised identity
    Authenticated,
    AccessShop {
        shop_id: String,
    },
    ModifyShop {
        shop_id: String,
    },
    Permission {
        permission: Permission,
        #[serde(default)]
        shop_id: Option<String>,
    },
    AnyPermission {
        permissions: Vec<Permission>,
        #[serde(default)]
        shop_id: Option<String>,
    },
    AllPermissions {
        permissions: Vec<Permission>,
        #[serde(default)]
        shop_id: Option<String>,
    },
    CustomerRecord {
        owner_id: String,
        shop_id: String,
    },
    Role {
        roles: Vec<Role>,
    },
}

impl AccessCheck {
    pub fn access_shop(shop_id: impl Into<String>) -> Self {
        AccessCheck::AccessShop {
            shop_id: shop_id.into(),
        }
    }

    pub fn modify_shop(shop_id: impl Into<String>) -> Self {
        AccessCheck::ModifyShop {
            shop_id: shop_id.into(),
        }
    }

    pub fn permission(permission: Permission, shop_id: Option<String>) -> Self {
        AccessCheck::Permission {
            permission,
            shop_id,
        }
    }

    /// Evaluate against an already-resolved principal
    pub fn evaluate(&self, principal: &Principal) -> bool {
        match self {
            AccessCheck::Authenticated => principal.role != Role::Unrecognized,
            AccessCheck::AccessShop { shop_id } => access::can_access_shop(principal, shop_id),
            AccessCheck::ModifyShop { shop_id } => access::can_modify_shop(principal, shop_id),
            AccessCheck::Permission {
                permission,
                shop_id,
            } => access::has_permission(principal, *permission, shop_id.as_deref()),
            AccessCheck::AnyPermission {
                permissions,
                shop_id,
            } => access::has_any_permission(principal, permissions, shop_id.as_deref()),
            AccessCheck::AllPermissions {
                permissions,
                shop_id,
            } => access::has_all_permissions(principal, permissions, shop_id.as_deref()),
            AccessCheck::CustomerRecord { owner_id, shop_id } => {
                access::can_access_customer_record(principal, owner_id, shop_id)
            }
            AccessCheck::Role { roles } => access::has_role(principal, roles),
        }
    }

    /// Error reported when this check fails for an identified principal
    pub fn denial(&self) -> AppError {
        match self {
            AccessCheck::AccessShop { shop_id } => {
                AppError::new(ErrorCode::ShopAccessDenied).with_detail("shop_id", shop_id.as_str())
            }
            AccessCheck::ModifyShop { shop_id } => {
                AppError::new(ErrorCode::ShopModifyDenied).with_detail("shop_id", shop_id.as_str())
            }
            AccessCheck::Permission { permission, .. } => {
                AppError::permission_denied(format!("Permission denied: {permission}"))
                    .with_detail("permission", permission.as_str())
            }
            AccessCheck::Role { roles } => {
                let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                AppError::role_required(format!("Requires one of: {}", names.join(", ")))
                    .with_detail("roles", names)
            }
            _ => Rejection::Forbidden.into(),
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            AccessCheck::Authenticated => "authenticated",
            AccessCheck::AccessShop { .. } => "access_shop",
            AccessCheck::ModifyShop { .. } => "modify_shop",
            AccessCheck::Permission { .. } => "permission",
            AccessCheck::AnyPermission { .. } => "any_permission",
            AccessCheck::AllPermissions { .. } => "all_permissions",
            AccessCheck::CustomerRecord { .. } => "customer_record",
            AccessCheck::Role { .. } => "role",
        }
    }
}

/// Resolve the principal and apply `check`
pub fn authorize(
    metadata: Option<IdentityMetadata>,
    check: &AccessCheck,
) -> Result<Principal, Rejection> {
    let principal = resolve_principal(metadata)?;
    if check.evaluate(&principal) {
        Ok(principal)
    } else {
        Err(Rejection::Forbidden)
    }
}
