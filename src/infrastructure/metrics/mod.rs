//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, route, and status
//! - HTTP request latency histograms
//! - Posts created, likes toggled, media uploads and emails sent
//! - Database connection pool gauges

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "red_apuntes";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, route, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Posts created, by scope ("feed" or "channel")
pub static POSTS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("posts_created_total", "Number of posts created").namespace(NAMESPACE),
        &["scope"],
    )
    .expect("Failed to create POSTS_CREATED_TOTAL metric")
});

/// Like toggles, by scope and resulting action ("added" or "removed")
pub static LIKES_TOGGLED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("likes_toggled_total", "Number of like toggles").namespace(NAMESPACE),
        &["scope", "action"],
    )
    .expect("Failed to create LIKES_TOGGLED_TOTAL metric")
});

/// Media host uploads, by folder and outcome
pub static MEDIA_UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("media_uploads_total", "Uploads sent to the media host").namespace(NAMESPACE),
        &["folder", "outcome"],
    )
    .expect("Failed to create MEDIA_UPLOADS_TOTAL metric")
});

/// Outbound emails, by kind and outcome
pub static EMAILS_SENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("emails_sent_total", "Emails handed to the mail provider").namespace(NAMESPACE),
        &["kind", "outcome"],
    )
    .expect("Failed to create EMAILS_SENT_TOTAL metric")
});

/// Database connection pool stats
pub static DB_POOL_CONNECTIONS: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new("db_pool_connections", "Database connection pool statistics").namespace(NAMESPACE),
        &["state"], // "idle", "active", "max"
    )
    .expect("Failed to create DB_POOL_CONNECTIONS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(POSTS_CREATED_TOTAL.clone()))
        .expect("Failed to register POSTS_CREATED_TOTAL");
    registry
        .register(Box::new(LIKES_TOGGLED_TOTAL.clone()))
        .expect("Failed to register LIKES_TOGGLED_TOTAL");
    registry
        .register(Box::new(MEDIA_UPLOADS_TOTAL.clone()))
        .expect("Failed to register MEDIA_UPLOADS_TOTAL");
    registry
        .register(Box::new(EMAILS_SENT_TOTAL.clone()))
        .expect("Failed to register EMAILS_SENT_TOTAL");
    registry
        .register(Box::new(DB_POOL_CONNECTIONS.clone()))
        .expect("Failed to register DB_POOL_CONNECTIONS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn record_post_created(scope: &str) {
    POSTS_CREATED_TOTAL.with_label_values(&[scope]).inc();
}

pub fn record_like_toggle(scope: &str, added: bool) {
    let action = if added { "added" } else { "removed" };
    LIKES_TOGGLED_TOTAL.with_label_values(&[scope, action]).inc();
}

pub fn record_media_upload(folder: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    MEDIA_UPLOADS_TOTAL.with_label_values(&[folder, outcome]).inc();
}

pub fn record_email(kind: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    EMAILS_SENT_TOTAL.with_label_values(&[kind, outcome]).inc();
}

/// Helper to update database pool stats
pub fn update_db_pool_stats(idle: u32, active: u32, max: u32) {
    DB_POOL_CONNECTIONS
        .with_label_values(&["idle"])
        .set(idle as f64);
    DB_POOL_CONNECTIONS
        .with_label_values(&["active"])
        .set(active as f64);
    DB_POOL_CONNECTIONS
        .with_label_values(&["max"])
        .set(max as f64);
}
