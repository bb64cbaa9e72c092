//! Authenticated principal
//!
//! The actor every access check is evaluated against. Staff permissions are
//! resolved once here, at construction, so predicates never consult the
//! registry themselves.

use serde::Serialize;
use shared::models::{PermissionSet, Role, StaffRole};

use super::permissions::permissions_for_staff_role;

/// Where a principal's permissions came from
///
/// An explicit list always wins over the staff-role default, even when it
/// is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Grants {
    Explicit {
        permissions: PermissionSet,
    },
    Derived {
        staff_role: Option<StaffRole>,
        permissions: PermissionSet,
    },
}

impl Grants {
    /// Resolve grants: explicit list if present, otherwise the staff-role table
    pub fn resolve(staff_role: Option<StaffRole>, explicit: Option<PermissionSet>) -> Self {
        match explicit {
            Some(permissions) => Grants::Explicit { permissions },
            None => Grants::Derived {
                staff_role,
                permissions: staff_role
                    .map(permissions_for_staff_role)
                    .unwrap_or_default(),
            },
        }
    }

    pub fn permissions(&self) -> &PermissionSet {
        match self {
            Grants::Explicit { permissions } | Grants::Derived { permissions, .. } => permissions,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Grants::Explicit { .. })
    }
}

/// Authenticated actor for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_role: Option<StaffRole>,
    pub grants: Grants,
}

impl Principal {
    /// Build a principal from already-parsed identity fields
    ///
    /// `shop_id` is dropped for roles that are not shop-bound and
    /// `staff_role` is dropped for anything but `SHOP_STAFF`.
    pub fn new(
        id: impl Into<String>,
        role: Role,
        shop_id: Option<String>,
        staff_role: Option<StaffRole>,
        explicit: Option<PermissionSet>,
    ) -> Self {
        let shop_id = shop_id.filter(|_| role.is_shop_bound());
        let staff_role = staff_role.filter(|_| role == Role::ShopStaff);
        Self {
            id: id.into(),
            role,
            shop_id,
            staff_role,
            grants: Grants::resolve(staff_role, explicit),
        }
    }

    pub fn super_admin(id: impl Into<String>) -> Self {
        Self::new(id, Role::SuperAdmin, None, None, None)
    }

    pub fn shop_admin(id: impl Into<String>, shop_id: impl Into<String>) -> Self {
        Self::new(id, Role::ShopAdmin, Some(shop_id.into()), None, None)
    }

    pub fn shop_staff(
        id: impl Into<String>,
        shop_id: impl Into<String>,
        staff_role: StaffRole,
    ) -> Self {
        Self::new(
            id,
            Role::ShopStaff,
            Some(shop_id.into()),
            Some(staff_role),
            None,
        )
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Self::new(id, Role::Customer, None, None, None)
    }

    /// Replace the grants with an explicit permission list
    pub fn with_explicit_permissions(mut self, permissions: PermissionSet) -> Self {
        self.grants = Grants::Explicit { permissions };
        self
    }

    /// Resolved permission set (only meaningful for staff)
    pub fn effective_permissions(&self) -> &PermissionSet {
        self.grants.permissions()
    }

    /// True when the principal belongs to `shop_id`
    pub fn is_member_of(&self, shop_id: &str) -> bool {
        self.shop_id.as_deref() == Some(shop_id)
    }
}
