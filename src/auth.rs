use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::{ResolvedRole, User},
    password::verify_password,
    repository::{Repository, RepositoryState},
    roles::resolve_role,
    session::{Session, SessionCodec, SessionLookup, clear_cookie, now_millis, read_session},
};

/// Header accepted as an identity in local development only.
pub const DEV_USER_HEADER: &str = "x-sizopi-user";

/// verify_credentials
///
/// Looks up the account by email when `identifier` contains `@`, by username otherwise,
/// and checks the password. An unknown account and a wrong password fail identically.
pub async fn verify_credentials(
    repo: &dyn Repository,
    identifier: &str,
    password: &str,
) -> Result<User, ApiError> {
    let identifier = identifier.trim();
    let user = if identifier.contains('@') {
        repo.find_user_by_email(identifier).await
    } else {
        repo.find_user_by_username(identifier).await
    };

    match user {
        Some(user) if verify_password(&user, password) => Ok(user),
        Some(user) => {
            tracing::info!(username = %user.username, "password mismatch");
            Err(ApiError::InvalidCredentials)
        }
        None => {
            tracing::info!(identifier, "unknown account");
            Err(ApiError::InvalidCredentials)
        }
    }
}

/// authenticate
///
/// Credential check followed by role resolution. The `get_user_role` procedure is
/// consulted afterwards as a cross-check only: disagreement is logged, the resolver's
/// answer is kept.
pub async fn authenticate(
    repo: &dyn Repository,
    identifier: &str,
    password: &str,
) -> Result<(User, ResolvedRole), ApiError> {
    let user = verify_credentials(repo, identifier, password).await?;
    let resolved = resolve_role(repo, &user.username).await?;

    let expected = resolved.role().as_str();
    match repo.procedure_role(&user.username).await {
        Some(reported) if reported.trim() == expected => {}
        reported => tracing::warn!(
            username = %user.username,
            resolved = expected,
            procedure = ?reported,
            "get_user_role disagrees with resolved role"
        ),
    }

    Ok((user, resolved))
}

/// SessionRejection
///
/// 401 for requests without a usable session. When the cookie was expired or tampered
/// with, the response also deletes it.
#[derive(Debug)]
pub struct SessionRejection {
    pub clear_cookie: bool,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let mut response = ApiError::Unauthorized.into_response();
        if self.clear_cookie {
            response
                .headers_mut()
                .append(header::SET_COOKIE, clear_cookie());
        }
        response
    }
}

/// Session Extractor
///
/// Makes `Session` usable as a handler argument on every protected route.
///
/// 1. A session already extracted for this request (by the route middleware) is reused.
/// 2. Local bypass: with `Env::Local`, the `x-sizopi-user` header names the user and the
///    role resolver runs for it.
/// 3. Otherwise the `session` cookie is verified and its 24-hour window enforced.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionCodec: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let config = AppConfig::from_ref(state);
        if config.env == Env::Local {
            let dev_user = parts
                .headers
                .get(DEV_USER_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string);

            if let Some(username) = dev_user {
                let repo = RepositoryState::from_ref(state);
                if repo.find_user_by_username(&username).await.is_some() {
                    if let Ok(resolved) = resolve_role(repo.as_ref(), &username).await {
                        tracing::debug!(username = %username, "dev header session");
                        let session = Session::new(&username, resolved, now_millis());
                        parts.extensions.insert(session.clone());
                        return Ok(session);
                    }
                }
            }
        }

        let codec = SessionCodec::from_ref(state);
        match read_session(&parts.headers, &codec, now_millis()) {
            SessionLookup::Active(session) => {
                parts.extensions.insert(session.clone());
                Ok(session)
            }
            lookup => Err(SessionRejection {
                clear_cookie: lookup.must_clear(),
            }),
        }
    }
}
