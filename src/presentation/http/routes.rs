//! Route Configuration
//!
//! Public and protected routers are built separately and merged; paths shared
//! by both (`GET /posts` vs `POST /posts`) combine their method routers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;

use super::handlers;
use crate::presentation::middleware::{
    auth_middleware, cors, logging, security_headers, SecurityHeaders,
};
use crate::startup::AppState;

/// Create the full application router with its middleware stack.
pub fn create_router(state: AppState) -> Router {
    let settings = state.settings.clone();
    let headers = Arc::new(SecurityHeaders::for_environment(&settings.environment));

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .route("/ping", get(handlers::health::ping))
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Needs MatchedPath, so it has to be a route layer.
        .route_layer(middleware::from_fn(logging::track_metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.upload.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn_with_state(headers, security_headers))
        .layer(logging::create_trace_layer())
        .layer(cors::create_cors_layer(&settings.cors))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/posts", get(handlers::post::list_posts))
        .route("/posts/search", get(handlers::post::search_posts))
        .route("/posts/{id}", get(handlers::post::get_post))
        .route("/users/{id}", get(handlers::user::get_user_profile))
        .route("/users/{id}/posts", get(handlers::user::get_user_posts))
        .route("/universities", get(handlers::directory::list_universities))
        .route("/universities/{id}", get(handlers::directory::get_university))
        .route(
            "/universities/{id}/careers",
            get(handlers::directory::list_university_careers),
        )
        .route("/careers", get(handlers::directory::list_careers))
        .route("/careers/{id}", get(handlers::directory::get_career))
        .route("/tags", get(handlers::directory::list_tags))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/posts", post(handlers::post::create_post))
        .route(
            "/posts/{id}",
            put(handlers::post::update_post).delete(handlers::post::delete_post),
        )
        .route(
            "/posts/{id}/likes",
            post(handlers::post::like_post).delete(handlers::post::unlike_post),
        )
        .route("/posts/{id}/comments", post(handlers::post::add_comment))
        .merge(channel_routes())
        .route(
            "/users/me",
            get(handlers::user::get_current_user).put(handlers::user::update_current_user),
        )
        .route("/users/me/password", put(handlers::user::change_password))
        .route("/users/followers", get(handlers::user::get_followers))
        .route("/users/{id}/follow", post(handlers::user::toggle_follow))
        .route("/universities", post(handlers::directory::create_university))
        .route(
            "/universities/{id}/careers",
            post(handlers::directory::create_career),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn channel_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/channels",
            post(handlers::channel::create_channel).get(handlers::channel::list_channels),
        )
        .route(
            "/channels/invitations",
            get(handlers::channel::pending_invitations),
        )
        .route(
            "/channels/invitations/{id}",
            post(handlers::channel::handle_invitation),
        )
        .route("/channels/{id}", get(handlers::channel::get_channel))
        .route(
            "/channels/{id}/invite",
            post(handlers::channel::invite_to_channel),
        )
        .route(
            "/channels/{id}/posts",
            post(handlers::channel_post::create_channel_post)
                .get(handlers::channel_post::list_channel_posts),
        )
        .route(
            "/channels/posts/{id}",
            axum::routing::delete(handlers::channel_post::delete_channel_post),
        )
        .route(
            "/channels/posts/{id}/comments",
            post(handlers::channel_post::add_channel_post_comment),
        )
        .route(
            "/channels/posts/{id}/like",
            post(handlers::channel_post::like_channel_post),
        )
}
