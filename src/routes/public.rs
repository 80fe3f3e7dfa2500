use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The form handlers answer with 303 redirects
/// so a plain HTML form can drive them.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        .route("/health", get(handlers::health))
        // POST /sign-in
        // Credential check, role resolution, signed cookie, redirect to the role dashboard.
        .route("/sign-in", post(handlers::auth::sign_in))
        // POST /sign-up
        // Validated registration through register_user_with_role.
        .route("/sign-up", post(handlers::auth::sign_up))
        // GET|POST /sign-out
        // Idempotent; always clears the cookie.
        .route(
            "/sign-out",
            get(handlers::auth::sign_out).post(handlers::auth::sign_out),
        )
        // GET /session
        // The decoded session or null. Deletes expired and tampered cookies.
        .route("/session", get(handlers::auth::get_session))
}
