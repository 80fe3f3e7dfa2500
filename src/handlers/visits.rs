use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    models::{
        AdopterKind, AdopterSummary, Adoption, CreateAdopterRequest, CreateAdoptionRequest,
        CreateReservationRequest, PAYMENT_STATUSES, RESERVATION_STATUSES, Reservation, Role, ShowAssignment, UpdatePaymentStatusRequest,
        UpdateReservationRequest, UpdateReservationStatusRequest,
    },
    repository::RepoError,
    session::Session,
    validation::{require_positive, require_status, require_text},
};

const VISITORS: [Role; 2] = [Role::Pengunjung, Role::Adopter];

// --- Reservations (visitor / adopter) ---

/// list_my_reservations
///
/// [Authenticated Route] The caller's reservations, newest visit first.
#[utoipa::path(
    get,
    path = "/protected/reservasi",
    responses((status = 200, description = "My reservations", body = [Reservation]))
)]
pub async fn list_my_reservations(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    session.require(&VISITORS)?;
    Ok(Json(state.repo.list_reservations_for(&session.username).await))
}

#[utoipa::path(
    post,
    path = "/protected/reservasi",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reserved", body = Reservation),
        (status = 409, description = "Already reserved for that facility and date")
    )
)]
pub async fn create_reservation(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    session.require(&VISITORS)?;
    require_text(&payload.nama_fasilitas, "nama_fasilitas")?;
    require_positive(payload.jumlah_tiket, "jumlah_tiket")?;
    let reservation = state
        .repo
        .create_reservation(&session.username, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// update_my_reservation
///
/// [Authenticated Route] Moves the visit date or changes the ticket count. Only
/// reservations still `Terjadwal` can be edited.
#[utoipa::path(
    put,
    path = "/protected/reservasi/{fasilitas}/{tanggal}",
    params(
        ("fasilitas" = String, Path, description = "Facility name"),
        ("tanggal" = NaiveDate, Path, description = "Visit date (YYYY-MM-DD)")
    ),
    request_body = UpdateReservationRequest,
    responses((status = 200, description = "Updated", body = Reservation), (status = 404, description = "Not Found"))
)]
pub async fn update_my_reservation(
    session: Session,
    State(state): State<AppState>,
    Path((fasilitas, tanggal)): Path<(String, NaiveDate)>,
    Json(payload): Json<UpdateReservationRequest>,
) -> Result<Json<Reservation>, ApiError> {
    session.require(&VISITORS)?;
    if let Some(jumlah) = payload.jumlah_tiket {
        require_positive(jumlah, "jumlah_tiket")?;
    }
    let reservation = state
        .repo
        .update_reservation(&session.username, &fasilitas, tanggal, &payload)
        .await?;
    Ok(Json(reservation))
}

#[utoipa::path(
    post,
    path = "/protected/reservasi/{fasilitas}/{tanggal}/batal",
    params(
        ("fasilitas" = String, Path, description = "Facility name"),
        ("tanggal" = NaiveDate, Path, description = "Visit date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Cancelled", body = Reservation),
        (status = 400, description = "Reservation is no longer scheduled"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn cancel_my_reservation(
    session: Session,
    State(state): State<AppState>,
    Path((fasilitas, tanggal)): Path<(String, NaiveDate)>,
) -> Result<Json<Reservation>, ApiError> {
    session.require(&VISITORS)?;
    match state
        .repo
        .cancel_reservation(&session.username, &fasilitas, tanggal)
        .await
    {
        Ok(reservation) => Ok(Json(reservation)),
        Err(RepoError::NotFound(_)) => {
            let exists = state
                .repo
                .list_reservations_for(&session.username)
                .await
                .into_iter()
                .any(|r| r.nama_fasilitas == fasilitas && r.tanggal_kunjungan == tanggal);
            Err(if exists {
                ApiError::Validation("Only scheduled reservations can be cancelled".to_string())
            } else {
                ApiError::NotFound("reservation")
            })
        }
        Err(e) => Err(e.into()),
    }
}

// --- Adopter / Trainer views ---

/// my_adoptions
///
/// [Authenticated Route] Animals adopted by the calling adopter.
#[utoipa::path(
    get,
    path = "/protected/adopsi-saya",
    responses((status = 200, description = "My adoptions", body = [Adoption]), (status = 403, description = "Not an adopter"))
)]
pub async fn my_adoptions(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<Adoption>>, ApiError> {
    session.require(&[Role::Adopter])?;
    let adopter = state
        .repo
        .find_adopter(&session.username)
        .await
        .ok_or(ApiError::NotFound("adopter"))?;
    Ok(Json(
        state.repo.list_adoptions_for_adopter(adopter.id_adopter).await,
    ))
}

#[utoipa::path(
    get,
    path = "/protected/jadwal-pertunjukan",
    responses((status = 200, description = "My show assignments", body = [ShowAssignment]))
)]
pub async fn my_show_schedule(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<ShowAssignment>>, ApiError> {
    session.require(&[Role::PelatihHewan])?;
    Ok(Json(state.repo.list_assignments(&session.username).await))
}

// --- Admin ---

#[utoipa::path(
    get,
    path = "/protected/admin/reservasi",
    responses((status = 200, description = "All reservations", body = [Reservation]))
)]
pub async fn list_all_reservations(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    session.require(&[Role::StafAdmin])?;
    Ok(Json(state.repo.list_all_reservations().await))
}

#[utoipa::path(
    put,
    path = "/protected/admin/reservasi/{username}/{fasilitas}/{tanggal}/status",
    params(
        ("username" = String, Path, description = "Visitor username"),
        ("fasilitas" = String, Path, description = "Facility name"),
        ("tanggal" = NaiveDate, Path, description = "Visit date (YYYY-MM-DD)")
    ),
    request_body = UpdateReservationStatusRequest,
    responses((status = 200, description = "Updated", body = Reservation), (status = 404, description = "Not Found"))
)]
pub async fn set_reservation_status(
    session: Session,
    State(state): State<AppState>,
    Path((username, fasilitas, tanggal)): Path<(String, String, NaiveDate)>,
    Json(payload): Json<UpdateReservationStatusRequest>,
) -> Result<Json<Reservation>, ApiError> {
    session.require(&[Role::StafAdmin])?;
    require_status(&payload.status, &RESERVATION_STATUSES, "status")?;
    let reservation = state
        .repo
        .set_reservation_status(&username, &fasilitas, tanggal, &payload.status)
        .await?;
    Ok(Json(reservation))
}

#[utoipa::path(
    get,
    path = "/protected/admin/adopter",
    responses((status = 200, description = "Adopters by total contribution", body = [AdopterSummary]))
)]
pub async fn list_adopters(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdopterSummary>>, ApiError> {
    session.require(&[Role::StafAdmin])?;
    Ok(Json(state.repo.list_adopters().await))
}

/// create_adopter
///
/// [Admin Route] Promotes an existing visitor to adopter, as an individual or an
/// organisation. Both rows are written in one transaction.
#[utoipa::path(
    post,
    path = "/protected/admin/adopter",
    request_body = CreateAdopterRequest,
    responses(
        (status = 201, description = "Created", body = AdopterSummary),
        (status = 400, description = "Not a visitor or missing fields"),
        (status = 409, description = "Already an adopter")
    )
)]
pub async fn create_adopter(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateAdopterRequest>,
) -> Result<(StatusCode, Json<AdopterSummary>), ApiError> {
    session.require(&[Role::StafAdmin])?;
    require_text(&payload.username, "username")?;
    match &payload.adopter {
        AdopterKind::Individu { nik, nama } => {
            require_text(nik, "nik")?;
            require_text(nama, "nama")?;
        }
        AdopterKind::Organisasi { npp, nama_organisasi } => {
            require_text(npp, "npp")?;
            require_text(nama_organisasi, "nama_organisasi")?;
        }
    }

    let adopter = state.repo.create_adopter(&payload).await?;
    tracing::info!(username = %adopter.username_adopter, id_adopter = %adopter.id_adopter, "adopter created");
    Ok((StatusCode::CREATED, Json(adopter)))
}

#[utoipa::path(
    get,
    path = "/protected/admin/adopsi",
    responses((status = 200, description = "All adoptions", body = [Adoption]))
)]
pub async fn list_adoptions(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<Adoption>>, ApiError> {
    session.require(&[Role::StafAdmin])?;
    Ok(Json(state.repo.list_adoptions().await))
}

/// create_adoption
///
/// [Admin Route] Registers an adoption with payment `Tertunda`.
#[utoipa::path(
    post,
    path = "/protected/admin/adopsi",
    request_body = CreateAdoptionRequest,
    responses(
        (status = 201, description = "Created", body = Adoption),
        (status = 400, description = "Invalid period or contribution")
    )
)]
pub async fn create_adoption(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateAdoptionRequest>,
) -> Result<(StatusCode, Json<Adoption>), ApiError> {
    session.require(&[Role::StafAdmin])?;
    if payload.kontribusi_finansial < 0 {
        return Err(ApiError::Validation(
            "kontribusi_finansial cannot be negative".to_string(),
        ));
    }
    if payload.tgl_berhenti_adopsi <= payload.tgl_mulai_adopsi {
        return Err(ApiError::Validation(
            "tgl_berhenti_adopsi must be after tgl_mulai_adopsi".to_string(),
        ));
    }
    let adoption = state.repo.create_adoption(&payload).await?;
    Ok((StatusCode::CREATED, Json(adoption)))
}

#[utoipa::path(
    put,
    path = "/protected/admin/adopsi/{id_adopter}/{id_hewan}/pembayaran",
    params(
        ("id_adopter" = Uuid, Path, description = "Adopter ID"),
        ("id_hewan" = Uuid, Path, description = "Animal ID")
    ),
    request_body = UpdatePaymentStatusRequest,
    responses((status = 200, description = "Updated", body = Adoption), (status = 404, description = "Not Found"))
)]
pub async fn set_adoption_payment(
    session: Session,
    State(state): State<AppState>,
    Path((id_adopter, id_hewan)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<Adoption>, ApiError> {
    session.require(&[Role::StafAdmin])?;
    require_status(&payload.status_pembayaran, &PAYMENT_STATUSES, "status_pembayaran")?;
    let adoption = state
        .repo
        .set_adoption_payment(id_adopter, id_hewan, &payload.status_pembayaran)
        .await?;
    Ok(Json(adoption))
}

#[utoipa::path(
    delete,
    path = "/protected/admin/adopsi/{id_adopter}/{id_hewan}",
    params(
        ("id_adopter" = Uuid, Path, description = "Adopter ID"),
        ("id_hewan" = Uuid, Path, description = "Animal ID")
    ),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_adoption(
    session: Session,
    State(state): State<AppState>,
    Path((id_adopter, id_hewan)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    session.require(&[Role::StafAdmin])?;
    state.repo.delete_adoption(id_adopter, id_hewan).await?;
    Ok(StatusCode::NO_CONTENT)
}
