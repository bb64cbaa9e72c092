//! Loyalty Gate - authorization service for the coffee-shop loyalty platform
//!
//! Sits behind the trusted gateway and decides, per request, whether the
//! caller may touch a shop's data. Sign-in and password reset are throttled
//! here and forwarded to the managed user directory.
//!
//! ```text
//! loyalty-gate/src/
//! ├── auth/       # registry, predicates, adapter, middleware, rate limiter
//! ├── identity/   # managed user directory client
//! ├── api/        # HTTP routes
//! ├── config.rs
//! ├── state.rs
//! └── logger.rs
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod identity;
pub mod logger;
pub mod state;

pub use auth::{AccessCheck, Principal, RateLimiter, Rejection, authorize};
pub use config::Config;
pub use state::AppState;
