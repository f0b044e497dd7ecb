//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod security;

pub use auth::{auth_middleware, AuthUser};
pub use security::{security_headers, SecurityHeaders};
