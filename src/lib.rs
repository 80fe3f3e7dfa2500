use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core services: identity, sessions, persistence.
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod profiles;
pub mod repository;
pub mod roles;
pub mod session;
pub mod validation;

// HTTP surface.
pub mod handlers;
pub mod routes;
use routes::{authenticated, public, staff};
use session::Session;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{MockRepository, PostgresRepository, RepositoryState};
pub use session::SessionCodec;

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` and browsable
/// through `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::sign_in, handlers::auth::sign_up, handlers::auth::sign_out,
        handlers::auth::get_session,
        handlers::dashboard::protected_home, handlers::dashboard::dashboard_pengunjung,
        handlers::dashboard::dashboard_dokter_hewan, handlers::dashboard::dashboard_penjaga_hewan,
        handlers::dashboard::dashboard_staf_administrasi, handlers::dashboard::dashboard_staf_pelatih,
        handlers::dashboard::get_profile, handlers::dashboard::update_profile,
        handlers::dashboard::change_password,
        handlers::care::list_animals, handlers::care::get_animal,
        handlers::care::list_medical_records, handlers::care::create_medical_record,
        handlers::care::update_medical_record, handlers::care::delete_medical_record,
        handlers::care::list_exam_schedules, handlers::care::create_exam_schedule,
        handlers::care::update_exam_schedule, handlers::care::delete_exam_schedule,
        handlers::care::list_feedings, handlers::care::create_feeding,
        handlers::care::update_feeding, handlers::care::delete_feeding, handlers::care::mark_fed,
        handlers::visits::list_my_reservations, handlers::visits::create_reservation,
        handlers::visits::update_my_reservation, handlers::visits::cancel_my_reservation,
        handlers::visits::my_adoptions, handlers::visits::my_show_schedule,
        handlers::visits::list_all_reservations, handlers::visits::set_reservation_status,
        handlers::visits::list_adopters, handlers::visits::create_adopter,
        handlers::visits::list_adoptions, handlers::visits::create_adoption,
        handlers::visits::set_adoption_payment, handlers::visits::delete_adoption
    ),
    components(
        schemas(
            models::Role, models::ResolvedRole, session::Session,
            handlers::auth::SessionResponse, handlers::dashboard::ProtectedResponse,
            models::SignInRequest, models::SignUpRequest, models::UpdateProfileRequest,
            models::ChangePasswordRequest, models::ProfileBase, models::VisitorProfile,
            models::AdopterDetails, models::VeterinarianProfile, models::KeeperProfile,
            models::AdminProfile, models::TrainerProfile,
            models::Animal, models::MedicalRecord, models::CreateMedicalRecordRequest,
            models::UpdateMedicalRecordRequest, models::MedicalRecordCreated,
            models::ExamSchedule, models::CreateExamScheduleRequest, models::UpdateExamScheduleRequest,
            models::Feeding, models::CreateFeedingRequest, models::UpdateFeedingRequest,
            models::Reservation, models::CreateReservationRequest, models::UpdateReservationRequest,
            models::UpdateReservationStatusRequest, models::Adoption, models::CreateAdoptionRequest,
            models::UpdatePaymentStatusRequest, models::AdopterKind, models::CreateAdopterRequest,
            models::AdopterSummary, models::ShowAssignment,
        )
    ),
    tags(
        (name = "sizopi", description = "SIZOPI sanctuary management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable application state. Handlers pull individual parts through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer (`PostgresRepository` in production, `MockRepository` in tests).
    pub repo: RepositoryState,
    /// Signs and verifies the session cookie.
    pub sessions: SessionCodec,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state, deriving the session codec from the configuration.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let sessions = SessionCodec::new(&config.session_secret, config.secure_cookies());
        Self {
            repo,
            sessions,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionCodec {
    fn from_ref(app_state: &AppState) -> SessionCodec {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Guards the `/protected` tree. Extracting `Session` rejects with 401 (deleting a bad
/// cookie) before any handler runs; on success the session is left in the request
/// extensions for the handler's own extractor.
async fn session_middleware(_session: Session, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles public and protected routes, the OpenAPI UI, and the tracing, request-id
/// and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let protected = authenticated::authenticated_routes()
        .merge(staff::staff_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/protected", protected)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
