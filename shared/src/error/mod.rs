//! Unified error system for the loyalty platform
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`ErrorCategory`]: Classification of errors by range
//! - [`AppError`]: Error type with code, message and optional details
//! - [`ErrorBody`]: JSON body returned to clients (`{ "error": ... }`)
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Rate limit errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::NotAuthenticated);
//! assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
//!
//! let err = AppError::permission_denied("Permission denied: MANAGE_MENU")
//!     .with_detail("shop_id", "shop_1");
//! assert_eq!(err.code, ErrorCode::PermissionDenied);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
