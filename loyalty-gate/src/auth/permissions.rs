//! Permission Registry
//!
//! Static staff-role → permission table.
//!
//! ## Rules
//! - Each staff role lists its permissions explicitly; nothing is inherited
//! - OWNER ⊇ MANAGER ⊇ BARISTA ⊇ CASHIER
//! - Unknown staff roles map to the empty set
//! - Shop admins are not in this table: they hold every permission in their
//!   own shop (see [`crate::auth::access`])

use shared::models::{Permission, PermissionSet, StaffRole};

/// Every permission identifier (12)
pub const ALL_PERMISSIONS: &[Permission] = &Permission::ALL;

/// Owner invitation flow: everything
pub const OWNER_PERMISSIONS: &[Permission] = &Permission::ALL;

/// Manager: runs the shop floor, no settings changes
pub const MANAGER_PERMISSIONS: &[Permission] = &[
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
];

/// Barista: transactions and loyalty stamps
pub const BARISTA_PERMISSIONS: &[Permission] = &[
    Permission::CreateTransaction,
    Permission::ViewTransactions,
    Permission::ViewCustomers,
    Permission::ManageCustomerLoyalty,
    Permission::ViewMenu,
    Permission::ViewLoyaltyPrograms,
];

/// Cashier: ring up sales, look up customers
pub const CASHIER_PERMISSIONS: &[Permission] = &[
    Permission::CreateTransaction,
    Permission::ViewCustomers,
    Permission::ViewMenu,
    Permission::ViewLoyaltyPrograms,
];

/// Raw table row for a staff role
pub fn staff_role_table(role: StaffRole) -> &'static [Permission] {
    match role {
        StaffRole::Owner => OWNER_PERMISSIONS,
        StaffRole::Manager => MANAGER_PERMISSIONS,
        StaffRole::Barista => BARISTA_PERMISSIONS,
        StaffRole::Cashier => CASHIER_PERMISSIONS,
        StaffRole::Unrecognized => &[],
    }
}

/// Default permissions for a staff role
pub fn permissions_for_staff_role(role: StaffRole) -> PermissionSet {
    PermissionSet::from(staff_role_table(role))
}

/// Default permissions for a staff role name; unknown names get nothing
pub fn permissions_for_staff_role_name(role_name: &str) -> PermissionSet {
    permissions_for_staff_role(StaffRole::parse(role_name))
}

/// Validate if a permission string is one of the known identifiers
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.iter().any(|p| p.as_str() == permission)
}
