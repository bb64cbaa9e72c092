//! Permission Model
//!
//! A permission is an atomic, named capability gating one action inside a
//! shop. The set is closed: identifiers are matched exactly and
//! case-sensitively, and there is no wildcard or hierarchy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Fine-grained shop permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    CreateTransaction,
    ViewTransactions,
    ViewCustomers,
    ManageCustomerLoyalty,
    ViewMenu,
    ManageMenu,
    ViewLoyaltyPrograms,
    ManageLoyaltyPrograms,
    ViewStaff,
    ManageStaff,
    ViewSettings,
    ManageSettings,
}

impl Permission {
    /// Every permission, in declaration order
    pub const ALL: [Permission; 12] = [
        Permission::CreateTransaction,
        Permission::ViewTransactions,
        Permission::ViewCustomers,
        Permission::ManageCustomerLoyalty,
        Permission::ViewMenu,
        Permission::ManageMenu,
        Permission::ViewLoyaltyPrograms,
        Permission::ManageLoyaltyPrograms,
        Permission::ViewStaff,
        Permission::ManageStaff,
        Permission::ViewSettings,
        Permission::ManageSettings,
    ];

    /// Wire identifier, e.g. `"MANAGE_MENU"`
    pub const fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateTransaction => "CREATE_TRANSACTION",
            Permission::ViewTransactions => "VIEW_TRANSACTIONS",
            Permission::ViewCustomers => "VIEW_CUSTOMERS",
            Permission::ManageCustomerLoyalty => "MANAGE_CUSTOMER_LOYALTY",
            Permission::ViewMenu => "VIEW_MENU",
            Permission::ManageMenu => "MANAGE_MENU",
            Permission::ViewLoyaltyPrograms => "VIEW_LOYALTY_PROGRAMS",
            Permission::ManageLoyaltyPrograms => "MANAGE_LOYALTY_PROGRAMS",
            Permission::ViewStaff => "VIEW_STAFF",
            Permission::ManageStaff => "MANAGE_STAFF",
            Permission::ViewSettings => "VIEW_SETTINGS",
            Permission::ManageSettings => "MANAGE_SETTINGS",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the twelve identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Ordered set of permissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    pub fn is_subset(&self, other: &PermissionSet) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&[Permission]> for PermissionSet {
    fn from(permissions: &[Permission]) -> Self {
        permissions.iter().copied().collect()
    }
}
