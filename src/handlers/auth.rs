use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::redirect_with;
use crate::{
    AppState,
    auth::authenticate,
    error::ApiError,
    models::{SignInRequest, SignUpRequest},
    password::hash_password,
    session::{Session, clear_cookie, now_millis, read_session},
    validation::validate_sign_up,
};

pub const SIGN_UP_SUCCESS: &str = "Registration successful, please sign in";

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session: Option<Session>,
}

/// sign_in
///
/// [Public Route] Form sign-in. On success the signed session cookie is set and the
/// browser is sent to the dashboard of the resolved role; on failure back to
/// `/sign-in?error=...`.
#[utoipa::path(
    post,
    path = "/sign-in",
    request_body(content = SignInRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the role dashboard (cookie set) or back to the form")
    )
)]
pub async fn sign_in(State(state): State<AppState>, Form(form): Form<SignInRequest>) -> Response {
    if form.identifier.trim().is_empty() || form.password.is_empty() {
        return redirect_with("/sign-in", "error", "Username/email and password are required")
            .into_response();
    }

    let (user, resolved) = match authenticate(state.repo.as_ref(), &form.identifier, &form.password).await {
        Ok(found) => found,
        Err(e) => return redirect_with("/sign-in", "error", &e.to_string()).into_response(),
    };

    match state.sessions.issue(&user.username, resolved, now_millis()) {
        Ok((session, cookie)) => {
            tracing::info!(username = %session.username, role = session.role.as_str(), "signed in");
            ([(header::SET_COOKIE, cookie)], Redirect::to(session.dashboard_route())).into_response()
        }
        Err(e) => {
            tracing::error!("session issue failed: {}", e);
            redirect_with("/sign-in", "error", &e.to_string()).into_response()
        }
    }
}

/// sign_up
///
/// [Public Route] Form registration. Validation runs before the repository is touched;
/// the account and its role marker are created by `register_user_with_role`.
#[utoipa::path(
    post,
    path = "/sign-up",
    request_body(content = SignUpRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to /sign-in on success, back to /sign-up with an error otherwise")
    )
)]
pub async fn sign_up(State(state): State<AppState>, Form(form): Form<SignUpRequest>) -> Redirect {
    let registration = match validate_sign_up(&form) {
        Ok(reg) => reg,
        Err(message) => return redirect_with("/sign-up", "error", &message),
    };

    let hash = match hash_password(&registration.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {}", e);
            return redirect_with("/sign-up", "error", &e.to_string());
        }
    };

    match state.repo.register_user(&registration, &hash).await {
        Ok(()) => {
            tracing::info!(username = %registration.username, role = registration.role.as_str(), "registered");
            redirect_with("/sign-in", "success", SIGN_UP_SUCCESS)
        }
        Err(e) => {
            let err = ApiError::from(e);
            if let ApiError::Internal(detail) = &err {
                tracing::error!("register_user failed: {}", detail);
            }
            redirect_with("/sign-up", "error", &err.to_string())
        }
    }
}

/// sign_out
///
/// [Public Route] Deletes the session cookie and returns to `/sign-in`. Safe to call
/// without a session.
#[utoipa::path(
    post,
    path = "/sign-out",
    responses((status = 303, description = "Cookie cleared, redirect to /sign-in"))
)]
pub async fn sign_out() -> Response {
    ([(header::SET_COOKIE, clear_cookie())], Redirect::to("/sign-in")).into_response()
}

/// get_session
///
/// [Public Route] The current session, or `null`. An expired or tampered cookie is
/// deleted on the way out.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session", body = SessionResponse))
)]
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let lookup = read_session(&headers, &state.sessions, now_millis());
    let clear = lookup.must_clear();
    let body = Json(SessionResponse {
        session: lookup.active(),
    });

    if clear {
        ([(header::SET_COOKIE, clear_cookie())], body).into_response()
    } else {
        body.into_response()
    }
}
