//! Shared types for the loyalty platform
//!
//! Roles, permissions and the unified error system used by the gate
//! service and its callers.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use http;
pub use models::{Permission, PermissionSet, Role, StaffRole};
pub use serde::{Deserialize, Serialize};
