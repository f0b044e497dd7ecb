//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod channel;
pub mod channel_post;
pub mod directory;
pub mod health;
pub mod post;
pub mod user;
