//! Data models
//!
//! Shared between the gate service and the dashboards (via API).

pub mod permission;
pub mod role;

// Re-exports
pub use permission::{Permission, PermissionSet, UnknownPermission};
pub use role::{Role, StaffRole};
