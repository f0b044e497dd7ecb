//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Media host client (Cloudinary)
//! - Transactional email client (Resend)
//! - Prometheus metrics

pub mod database;
pub mod mail;
pub mod media;
pub mod metrics;
pub mod repositories;
