use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
    response::IntoResponse,
};
use chrono::NaiveDate;
use sizopi::{
    AppState,
    auth::{DEV_USER_HEADER, authenticate, verify_credentials},
    config::{AppConfig, Env},
    error::ApiError,
    models::{ResolvedRole, Role, User},
    password::{hash_password, verify_password},
    repository::{MockRepository, RepositoryState},
    session::{SESSION_TTL_MS, Session, now_millis},
};
use std::sync::Arc;

const TEST_SECRET: &str = "auth-test-secret";

// --- Setup Helpers ---

fn user(username: &str, password: &str, hashed: Option<String>) -> User {
    User {
        username: username.to_string(),
        email: format!("{}@sizopi.id", username),
        password: password.to_string(),
        hashed_password: hashed,
        nama_depan: "Siti".to_string(),
        nama_tengah: Some("Nur".to_string()),
        nama_belakang: "Aisyah".to_string(),
        no_telepon: "0812000000".to_string(),
    }
}

fn born() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
}

fn seeded_repo() -> MockRepository {
    MockRepository::new()
        .with_user(user("budi", "rahasia123", None))
        .with_visitor("budi", "Depok", born())
        .with_adopter("budi", uuid::Uuid::new_v4(), 0)
        .with_user(user("drsiti", "", Some(hash_password("dokter123").unwrap())))
        .with_veterinarian("drsiti", "STR-1", &["Reptil", "Primata"])
}

fn create_app_state(env: Env, repo: MockRepository) -> AppState {
    let config = AppConfig {
        env,
        session_secret: TEST_SECRET.to_string(),
        ..AppConfig::default()
    };
    AppState::new(Arc::new(repo) as RepositoryState, config)
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_cookie(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("session={}", token)).unwrap(),
    );
}

fn budi_session(signed_in_at: i64) -> Session {
    Session::new(
        "budi",
        ResolvedRole::Adopter {
            alamat: "Depok".to_string(),
            tgl_lahir: born(),
        },
        signed_in_at,
    )
}

// --- Credential Checks ---

#[tokio::test]
async fn test_verify_credentials_by_username_and_email() {
    let repo = seeded_repo();

    let by_name = verify_credentials(&repo, "budi", "rahasia123").await.unwrap();
    assert_eq!(by_name.username, "budi");

    let by_email = verify_credentials(&repo, "drsiti@sizopi.id", "dokter123").await.unwrap();
    assert_eq!(by_email.username, "drsiti");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_fail_identically() {
    let repo = seeded_repo();

    let wrong = verify_credentials(&repo, "budi", "salah").await.unwrap_err();
    let unknown = verify_credentials(&repo, "siapa", "rahasia123").await.unwrap_err();

    assert!(matches!(wrong, ApiError::InvalidCredentials));
    assert!(matches!(unknown, ApiError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_forms() {
    let hash = hash_password("rahasia123").unwrap();
    assert!(hash.starts_with("$argon2"));

    // Legacy plaintext column.
    assert!(verify_password(&user("a", "rahasia123", None), "rahasia123"));
    assert!(!verify_password(&user("a", "rahasia123", None), "rahasia12"));
    // PHC string in the plain column.
    assert!(verify_password(&user("a", &hash, None), "rahasia123"));
    // hashed_password wins over the plain column.
    assert!(verify_password(&user("a", "lama", Some(hash.clone())), "rahasia123"));
    assert!(!verify_password(&user("a", "lama", Some(hash)), "lama"));
    // An empty stored password never matches.
    assert!(!verify_password(&user("a", "", None), ""));
}

#[tokio::test]
async fn test_authenticate_resolves_role() {
    let repo = seeded_repo();

    let (user, resolved) = authenticate(&repo, "drsiti", "dokter123").await.unwrap();
    assert_eq!(user.nama_lengkap(), "Siti Nur Aisyah");
    assert_eq!(
        resolved,
        ResolvedRole::DokterHewan {
            no_str: "STR-1".to_string(),
            spesialisasi: vec!["Reptil".to_string(), "Primata".to_string()],
        }
    );
}

#[tokio::test]
async fn test_authenticate_keeps_resolver_answer_on_procedure_mismatch() {
    let repo = seeded_repo().with_procedure_role("budi", Some("pengunjung"));

    let (_, resolved) = authenticate(&repo, "budi", "rahasia123").await.unwrap();
    assert_eq!(resolved.role(), Role::Adopter);
}

#[tokio::test]
async fn test_authenticate_without_role_marker() {
    let repo = MockRepository::new().with_user(user("yatim", "rahasia123", None));

    let err = authenticate(&repo, "yatim", "rahasia123").await.unwrap_err();
    assert!(matches!(err, ApiError::NoRoleFound));
}

// --- Session Extractor ---

#[tokio::test]
async fn test_extractor_accepts_valid_cookie() {
    let app_state = create_app_state(Env::Production, seeded_repo());
    let token = app_state.sessions.encode(&budi_session(now_millis())).unwrap();

    let mut parts = get_request_parts(Method::GET, "/protected".parse().unwrap());
    with_cookie(&mut parts, &token);

    let session = Session::from_request_parts(&mut parts, &app_state).await.unwrap();
    assert_eq!(session.username, "budi");
    assert_eq!(session.role, Role::Adopter);

    // Cached for later extractors of the same request.
    assert_eq!(parts.extensions.get::<Session>(), Some(&session));
}

#[tokio::test]
async fn test_extractor_missing_cookie_is_401_without_clearing() {
    let app_state = create_app_state(Env::Production, seeded_repo());
    let mut parts = get_request_parts(Method::GET, "/protected".parse().unwrap());

    let rejection = Session::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(!rejection.clear_cookie);

    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_extractor_expired_cookie_is_cleared() {
    let app_state = create_app_state(Env::Production, seeded_repo());
    let stale = budi_session(now_millis() - SESSION_TTL_MS - 60_000);
    let token = app_state.sessions.encode(&stale).unwrap();

    let mut parts = get_request_parts(Method::GET, "/protected".parse().unwrap());
    with_cookie(&mut parts, &token);

    let rejection = Session::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(rejection.clear_cookie);

    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cleared = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_extractor_tampered_cookie_is_cleared() {
    let app_state = create_app_state(Env::Production, seeded_repo());
    let token = app_state.sessions.encode(&budi_session(now_millis())).unwrap();

    let mut parts = get_request_parts(Method::GET, "/protected".parse().unwrap());
    with_cookie(&mut parts, &format!("{}x", token));

    let rejection = Session::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(rejection.clear_cookie);
}

#[tokio::test]
async fn test_local_dev_header_bypass() {
    let app_state = create_app_state(Env::Local, seeded_repo());

    let mut parts = get_request_parts(Method::GET, "/protected".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static(DEV_USER_HEADER),
        header::HeaderValue::from_static("drsiti"),
    );

    let session = Session::from_request_parts(&mut parts, &app_state).await.unwrap();
    assert_eq!(session.username, "drsiti");
    assert_eq!(session.role, Role::DokterHewan);
}

#[tokio::test]
async fn test_local_dev_header_for_unknown_user_falls_through() {
    let app_state = create_app_state(Env::Local, seeded_repo());

    let mut parts = get_request_parts(Method::GET, "/protected".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static(DEV_USER_HEADER),
        header::HeaderValue::from_static("siapa"),
    );

    assert!(Session::from_request_parts(&mut parts, &app_state).await.is_err());
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let app_state = create_app_state(Env::Production, seeded_repo());

    let mut parts = get_request_parts(Method::GET, "/protected".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static(DEV_USER_HEADER),
        header::HeaderValue::from_static("drsiti"),
    );

    let rejection = Session::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
}
