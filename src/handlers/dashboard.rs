use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::today;
use crate::{
    AppState,
    error::ApiError,
    models::{
        AdminProfile, ChangePasswordRequest, KeeperProfile, Role, TrainerProfile,
        UpdateProfileRequest, VeterinarianProfile, VisitorProfile,
    },
    password::{hash_password, verify_password},
    profiles,
    roles::resolve_role,
    session::Session,
    validation::{optional_text, split_list, validate_new_password},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProtectedResponse {
    pub session: Session,
    pub dashboard: String,
}

/// protected_home
///
/// [Authenticated Route] The caller's session and the dashboard it belongs on.
#[utoipa::path(
    get,
    path = "/protected",
    responses(
        (status = 200, description = "Current session", body = ProtectedResponse),
        (status = 401, description = "No session")
    )
)]
pub async fn protected_home(session: Session) -> Json<ProtectedResponse> {
    let dashboard = session.dashboard_route().to_string();
    Json(ProtectedResponse { session, dashboard })
}

/// dashboard_pengunjung
///
/// [Authenticated Route] Visitor dashboard. Adopters get the same view with their
/// adoption summary filled in.
#[utoipa::path(
    get,
    path = "/protected/dashboard/pengunjung",
    responses(
        (status = 200, description = "Visitor profile", body = VisitorProfile),
        (status = 403, description = "Not a visitor"),
        (status = 404, description = "Profile incomplete")
    )
)]
pub async fn dashboard_pengunjung(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<VisitorProfile>, ApiError> {
    session.require(&[Role::Pengunjung, Role::Adopter])?;
    let profile = if session.role == Role::Adopter {
        profiles::adopter_profile(state.repo.as_ref(), &session.username).await
    } else {
        profiles::visitor_profile(state.repo.as_ref(), &session.username).await
    };
    profile.map(Json).ok_or(ApiError::NotFound("profile"))
}

/// dashboard_dokter_hewan
///
/// [Authenticated Route] Veterinarian dashboard.
#[utoipa::path(
    get,
    path = "/protected/dashboard/dokter-hewan",
    responses(
        (status = 200, description = "Veterinarian profile", body = VeterinarianProfile),
        (status = 403, description = "Not a veterinarian")
    )
)]
pub async fn dashboard_dokter_hewan(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<VeterinarianProfile>, ApiError> {
    session.require(&[Role::DokterHewan])?;
    profiles::veterinarian_profile(state.repo.as_ref(), &session.username)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}

/// dashboard_penjaga_hewan
///
/// [Authenticated Route] Animal keeper dashboard.
#[utoipa::path(
    get,
    path = "/protected/dashboard/penjaga-hewan",
    responses(
        (status = 200, description = "Keeper profile", body = KeeperProfile),
        (status = 403, description = "Not an animal keeper")
    )
)]
pub async fn dashboard_penjaga_hewan(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<KeeperProfile>, ApiError> {
    session.require(&[Role::PenjagaHewan])?;
    profiles::keeper_profile(state.repo.as_ref(), &session.username)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}

/// dashboard_staf_administrasi
///
/// [Authenticated Route] Admin dashboard with today's ticket figures.
#[utoipa::path(
    get,
    path = "/protected/dashboard/staf-administrasi",
    responses(
        (status = 200, description = "Admin profile", body = AdminProfile),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn dashboard_staf_administrasi(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<AdminProfile>, ApiError> {
    session.require(&[Role::StafAdmin])?;
    profiles::admin_profile(state.repo.as_ref(), &session.username, today())
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}

/// dashboard_staf_pelatih
///
/// [Authenticated Route] Trainer dashboard with today's show assignments.
#[utoipa::path(
    get,
    path = "/protected/dashboard/staf-pelatih",
    responses(
        (status = 200, description = "Trainer profile", body = TrainerProfile),
        (status = 403, description = "Not a trainer")
    )
)]
pub async fn dashboard_staf_pelatih(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<TrainerProfile>, ApiError> {
    session.require(&[Role::PelatihHewan])?;
    profiles::trainer_profile(state.repo.as_ref(), &session.username, today())
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}

/// get_profile
///
/// [Authenticated Route] Profile of whatever role the session carries, tagged by `role`.
#[utoipa::path(
    get,
    path = "/protected/profil",
    responses(
        (status = 200, description = "Role-tagged profile"),
        (status = 404, description = "Profile incomplete")
    )
)]
pub async fn get_profile(session: Session, State(state): State<AppState>) -> Result<Response, ApiError> {
    let profile = profiles::load_profile(state.repo.as_ref(), &session, today())
        .await
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile).into_response())
}

/// update_profile
///
/// [Authenticated Route] Updates names and phone number, plus `alamat`/`tgl_lahir` for
/// visitors and `spesialisasi` for veterinarians. Fields for other roles are ignored.
/// The session cookie is re-issued (same sign-in timestamp) so its role data stays current.
#[utoipa::path(
    put,
    path = "/protected/profil",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated role-tagged profile"),
        (status = 400, description = "Invalid field")
    )
)]
pub async fn update_profile(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    optional_text(payload.nama_depan.as_deref(), "nama_depan")?;
    optional_text(payload.nama_belakang.as_deref(), "nama_belakang")?;
    optional_text(payload.no_telepon.as_deref(), "no_telepon")?;
    optional_text(payload.alamat.as_deref(), "alamat")?;

    let changes = UpdateProfileRequest {
        spesialisasi: payload
            .spesialisasi
            .as_ref()
            .map(|list| split_list(&list.join(","))),
        ..payload
    };
    let repo = state.repo.as_ref();
    repo.update_profile(&session.username, session.role, &changes).await?;

    let resolved = resolve_role(repo, &session.username).await?;
    let refreshed = Session {
        role: resolved.role(),
        user_data: resolved,
        ..session
    };
    let token = state.sessions.encode(&refreshed)?;
    let cookie = state.sessions.set_cookie(&token)?;

    let profile = profiles::load_profile(repo, &refreshed, today())
        .await
        .ok_or(ApiError::NotFound("profile"))?;

    Ok(([(header::SET_COOKIE, cookie)], Json(profile)).into_response())
}

/// change_password
///
/// [Authenticated Route] Requires the current password. The new one is stored as an
/// Argon2 hash.
#[utoipa::path(
    put,
    path = "/protected/profil/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation failed or current password wrong")
    )
)]
pub async fn change_password(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    validate_new_password(
        &payload.old_password,
        &payload.new_password,
        &payload.confirm_password,
    )?;

    let user = state
        .repo
        .find_user_by_username(&session.username)
        .await
        .ok_or(ApiError::NotFound("user"))?;
    if !verify_password(&user, &payload.old_password) {
        return Err(ApiError::Validation("Current password is incorrect".to_string()));
    }

    let hash = hash_password(&payload.new_password)?;
    state.repo.set_password_hash(&session.username, &hash).await?;
    tracing::info!(username = %session.username, "password changed");
    Ok(StatusCode::NO_CONTENT)
}
