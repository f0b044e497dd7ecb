//! Security Headers Middleware
//!
//! Every response carries a fixed set of hardening headers. The header list
//! is built once at startup; HSTS is only emitted in production where the API
//! sits behind TLS.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// One year
const HSTS_MAX_AGE_SECS: u64 = 31_536_000;

/// Precomputed response headers
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// Headers for a JSON API. `hsts` enables `Strict-Transport-Security`.
    pub fn new(hsts: bool) -> Self {
        let mut headers = vec![
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
            (
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
            ),
            (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        ];

        if hsts {
            let value = format!("max-age={}; includeSubDomains", HSTS_MAX_AGE_SECS);
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.push((header::STRICT_TRANSPORT_SECURITY, value));
            }
        }

        Self { headers }
    }

    /// HSTS only for the `production` environment.
    pub fn for_environment(environment: &str) -> Self {
        Self::new(environment.eq_ignore_ascii_case("production"))
    }
}

/// Use with `axum::middleware::from_fn_with_state`.
pub async fn security_headers(
    State(config): State<Arc<SecurityHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in &config.headers {
        // Handlers may set their own policy.
        if !headers.contains_key(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
    response
}
