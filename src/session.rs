use axum::http::{HeaderMap, HeaderValue, header};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::{ResolvedRole, Role},
};

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;
pub const SESSION_TTL_MS: i64 = SESSION_TTL_SECS * 1000;

/// Session
///
/// The signed-in identity carried by the `session` cookie. `timestamp` is the sign-in
/// instant in milliseconds since the Unix epoch; the session lives for 24 hours from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub timestamp: i64,
    #[serde(rename = "userData")]
    pub user_data: ResolvedRole,
}

impl Session {
    pub fn new(username: &str, resolved: ResolvedRole, now_ms: i64) -> Self {
        Self {
            username: username.to_string(),
            role: resolved.role(),
            timestamp: now_ms,
            user_data: resolved,
        }
    }

    /// Role gate used by handlers: `Forbidden` unless the session role is listed.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(username = %self.username, role = ?self.role, "role check failed");
            Err(ApiError::Forbidden)
        }
    }

    pub fn dashboard_route(&self) -> &'static str {
        self.role.dashboard_route()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    session: Session,
    // Seconds; informational only, expiry is judged from `timestamp`.
    exp: i64,
}

/// Outcome of reading the session cookie from a request.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionLookup {
    Active(Session),
    Expired,
    Invalid,
    Missing,
}

impl SessionLookup {
    /// Expired and tampered cookies are deleted on the response.
    pub fn must_clear(&self) -> bool {
        matches!(self, SessionLookup::Expired | SessionLookup::Invalid)
    }

    pub fn active(self) -> Option<Session> {
        match self {
            SessionLookup::Active(session) => Some(session),
            _ => None,
        }
    }
}

/// SessionCodec
///
/// Signs and verifies session cookies (HS256) and renders the `Set-Cookie` values.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    secure: bool,
}

impl SessionCodec {
    pub fn new(secret: &str, secure: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            secure,
        }
    }

    pub fn encode(&self, session: &Session) -> Result<String, ApiError> {
        let claims = Claims {
            session: session.clone(),
            exp: session.timestamp / 1000 + SESSION_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("session encode failed: {}", e)))
    }

    /// decode
    ///
    /// Verifies the signature, then applies the 24-hour window against `now_ms`.
    /// A session exactly 24 hours old is still active.
    pub fn decode(&self, token: &str, now_ms: i64) -> SessionLookup {
        let session = match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims.session,
            Err(e) => {
                tracing::debug!("rejected session cookie: {}", e);
                return SessionLookup::Invalid;
            }
        };

        if now_ms - session.timestamp > SESSION_TTL_MS {
            tracing::debug!(username = %session.username, "session expired");
            return SessionLookup::Expired;
        }
        SessionLookup::Active(session)
    }

    /// Builds the session for a freshly authenticated user and its `Set-Cookie` value.
    pub fn issue(
        &self,
        username: &str,
        resolved: ResolvedRole,
        now_ms: i64,
    ) -> Result<(Session, HeaderValue), ApiError> {
        let session = Session::new(username, resolved, now_ms);
        let token = self.encode(&session)?;
        Ok((session, self.set_cookie(&token)?))
    }

    pub fn set_cookie(&self, token: &str) -> Result<HeaderValue, ApiError> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, token, SESSION_TTL_SECS
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.to_string()))
    }
}

/// `Set-Cookie` value deleting the session cookie.
pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; Path=/; HttpOnly; Max-Age=0")
}

/// Value of cookie `name` across every `Cookie` header of the request.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn read_session(headers: &HeaderMap, codec: &SessionCodec, now_ms: i64) -> SessionLookup {
    match cookie_value(headers, SESSION_COOKIE) {
        Some(token) if !token.is_empty() => codec.decode(token, now_ms),
        _ => SessionLookup::Missing,
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
