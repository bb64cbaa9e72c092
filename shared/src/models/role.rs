//! Role Model
//!
//! Platform roles and the staff sub-roles that refine `SHOP_STAFF`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform role of a principal
///
/// Strings outside the enumeration become [`Role::Unrecognized`], which
/// every access check treats as unauthorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    ShopAdmin,
    ShopStaff,
    Customer,
    #[serde(other)]
    Unrecognized,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::ShopAdmin => "SHOP_ADMIN",
            Role::ShopStaff => "SHOP_STAFF",
            Role::Customer => "CUSTOMER",
            Role::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Exact, case-sensitive parse
    pub fn parse(s: &str) -> Self {
        match s {
            "SUPER_ADMIN" => Role::SuperAdmin,
            "SHOP_ADMIN" => Role::ShopAdmin,
            "SHOP_STAFF" => Role::ShopStaff,
            "CUSTOMER" => Role::Customer,
            _ => Role::Unrecognized,
        }
    }

    /// Roles bound to exactly one shop
    pub const fn is_shop_bound(&self) -> bool {
        matches!(self, Role::ShopAdmin | Role::ShopStaff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refinement of `SHOP_STAFF` that selects the default permission set
///
/// `Owner` only comes from the owner invitation flow and is the widest set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Owner,
    Manager,
    Barista,
    Cashier,
    #[serde(other)]
    Unrecognized,
}

impl StaffRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Owner => "OWNER",
            StaffRole::Manager => "MANAGER",
            StaffRole::Barista => "BARISTA",
            StaffRole::Cashier => "CASHIER",
            StaffRole::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Exact, case-sensitive parse
    pub fn parse(s: &str) -> Self {
        match s {
            "OWNER" => StaffRole::Owner,
            "MANAGER" => StaffRole::Manager,
            "BARISTA" => StaffRole::Barista,
            "CASHIER" => StaffRole::Cashier,
            _ => StaffRole::Unrecognized,
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
