pub mod authz;
pub mod middleware;
pub mod rest;
pub mod state;


use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use studylens_core::extract::MAX_UPLOAD_BYTES;

pub use middleware::require_auth;
use rest::{
    ask_handler, delete_session_handler, get_current_user_handler, get_session_handler,
    list_sessions_handler, update_theme_handler, upload_handler, youtube_handler,
};
use state::AppState;

/// Assembles the API routes. Every endpoint sits behind the identity
/// middleware; the upload limit matches the extractor's validation bound.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/user", get(get_current_user_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/youtube", post(youtube_handler))
        .route("/api/ask", post(ask_handler))
        .route("/api/sessions", get(list_sessions_handler))
        .route(
            "/api/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/api/user/theme", patch(update_theme_handler))
        .layer(axum_middleware::from_fn(require_auth))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state)
}
