//! Authorization core
//!
//! - [`permissions`] - staff-role → permission registry
//! - [`Principal`] - authenticated actor with resolved grants
//! - [`access`] - access predicates (`can_access_shop`, `has_permission`, ...)
//! - [`authorize`] - request adapter: identity metadata → decision
//! - [`require_auth`] / [`require_permission`] - axum middleware
//! - [`rate_limit`] - fixed-window limiter for authentication routes

pub mod access;
pub mod adapter;
pub mod extractor;
pub mod middleware;
pub mod permissions;
pub mod principal;
pub mod rate_limit;

pub use access::{
    can_access_customer_record, can_access_shop, can_modify_shop, has_all_permissions,
    has_any_permission, has_permission, has_role,
};
pub use adapter::{
    AccessCheck, HeaderIdentity, IdentityMetadata, Rejection, SessionIdentity, SessionResolver,
    authorize, parse_permission_list, resolve_principal,
};
pub use middleware::{
    PrincipalExt, require_auth, require_permission, require_shop_access, require_shop_modify,
};
pub use permissions::{permissions_for_staff_role, permissions_for_staff_role_name};
pub use principal::{Grants, Principal};
pub use rate_limit::{ClientIp, RateLimitKey, RateLimitPolicy, RateLimitStatus, RateLimiter};
