use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::require_animal;
use crate::{
    AppState,
    error::ApiError,
    models::{
        Animal, CreateExamScheduleRequest, CreateFeedingRequest, CreateMedicalRecordRequest,
        ExamSchedule, Feeding, HEALTH_STATUSES, MedicalRecord, MedicalRecordCreated, Role,
        UpdateExamScheduleRequest, UpdateFeedingRequest, UpdateMedicalRecordRequest,
    },
    session::Session,
    validation::{optional_text, require_positive, require_status, require_text},
};

// --- Animals ---

/// list_animals
///
/// [Authenticated Route] Every animal in the sanctuary; readable by all roles.
#[utoipa::path(
    get,
    path = "/protected/hewan",
    responses((status = 200, description = "Animals", body = [Animal]))
)]
pub async fn list_animals(_session: Session, State(state): State<AppState>) -> Json<Vec<Animal>> {
    Json(state.repo.list_animals().await)
}

#[utoipa::path(
    get,
    path = "/protected/hewan/{id}",
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses(
        (status = 200, description = "Animal", body = Animal),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_animal(
    _session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Animal>, ApiError> {
    state
        .repo
        .get_animal(id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("animal"))
}

// --- Medical Records (veterinarian) ---

/// list_medical_records
///
/// [Authenticated Route] Medical history of one animal, newest first.
#[utoipa::path(
    get,
    path = "/protected/hewan/{id}/catatan-medis",
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses((status = 200, description = "Medical records", body = [MedicalRecord]))
)]
pub async fn list_medical_records(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MedicalRecord>>, ApiError> {
    session.require(&[Role::DokterHewan])?;
    require_animal(state.repo.as_ref(), id).await?;
    Ok(Json(state.repo.list_medical_records(id).await))
}

/// create_medical_record
///
/// [Authenticated Route] Records an examination by the calling veterinarian. Goes
/// through `insert_medical_record_with_trigger`; the trigger's notice (for example a
/// rescheduled check-up) is returned alongside the record.
#[utoipa::path(
    post,
    path = "/protected/hewan/{id}/catatan-medis",
    params(("id" = Uuid, Path, description = "Animal ID")),
    request_body = CreateMedicalRecordRequest,
    responses(
        (status = 201, description = "Created", body = MedicalRecordCreated),
        (status = 400, description = "Invalid health status"),
        (status = 409, description = "A record for that date exists")
    )
)]
pub async fn create_medical_record(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<MedicalRecordCreated>), ApiError> {
    session.require(&[Role::DokterHewan])?;
    require_status(&payload.status_kesehatan, &HEALTH_STATUSES, "status_kesehatan")?;
    require_animal(state.repo.as_ref(), id).await?;

    let notice = state
        .repo
        .create_medical_record(id, &session.username, &payload)
        .await?;
    if let Some(text) = &notice {
        tracing::info!(id_hewan = %id, "medical record trigger: {}", text);
    }

    let record = MedicalRecord {
        id_hewan: id,
        username_dh: session.username,
        tanggal_pemeriksaan: payload.tanggal_pemeriksaan,
        diagnosis: payload.diagnosis,
        pengobatan: payload.pengobatan,
        status_kesehatan: payload.status_kesehatan,
        catatan_tindak_lanjut: payload.catatan_tindak_lanjut,
    };
    Ok((StatusCode::CREATED, Json(MedicalRecordCreated { record, notice })))
}

#[utoipa::path(
    put,
    path = "/protected/hewan/{id}/catatan-medis/{tanggal}",
    params(
        ("id" = Uuid, Path, description = "Animal ID"),
        ("tanggal" = NaiveDate, Path, description = "Examination date (YYYY-MM-DD)")
    ),
    request_body = UpdateMedicalRecordRequest,
    responses(
        (status = 200, description = "Updated", body = MedicalRecord),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_medical_record(
    session: Session,
    State(state): State<AppState>,
    Path((id, tanggal)): Path<(Uuid, NaiveDate)>,
    Json(payload): Json<UpdateMedicalRecordRequest>,
) -> Result<Json<MedicalRecord>, ApiError> {
    session.require(&[Role::DokterHewan])?;
    let record = state
        .repo
        .update_medical_record(id, tanggal, &payload)
        .await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/protected/hewan/{id}/catatan-medis/{tanggal}",
    params(
        ("id" = Uuid, Path, description = "Animal ID"),
        ("tanggal" = NaiveDate, Path, description = "Examination date (YYYY-MM-DD)")
    ),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_medical_record(
    session: Session,
    State(state): State<AppState>,
    Path((id, tanggal)): Path<(Uuid, NaiveDate)>,
) -> Result<StatusCode, ApiError> {
    session.require(&[Role::DokterHewan])?;
    state.repo.delete_medical_record(id, tanggal).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Examination Schedules (veterinarian) ---

#[utoipa::path(
    get,
    path = "/protected/hewan/{id}/jadwal-pemeriksaan",
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses((status = 200, description = "Upcoming examinations", body = [ExamSchedule]))
)]
pub async fn list_exam_schedules(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ExamSchedule>>, ApiError> {
    session.require(&[Role::DokterHewan])?;
    require_animal(state.repo.as_ref(), id).await?;
    Ok(Json(state.repo.list_exam_schedules(id).await))
}

/// create_exam_schedule
///
/// [Authenticated Route] Schedules the next examination. The routine frequency (in
/// months) defaults to 3.
#[utoipa::path(
    post,
    path = "/protected/hewan/{id}/jadwal-pemeriksaan",
    params(("id" = Uuid, Path, description = "Animal ID")),
    request_body = CreateExamScheduleRequest,
    responses((status = 201, description = "Created", body = ExamSchedule))
)]
pub async fn create_exam_schedule(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateExamScheduleRequest>,
) -> Result<(StatusCode, Json<ExamSchedule>), ApiError> {
    session.require(&[Role::DokterHewan])?;
    if let Some(freq) = payload.freq_pemeriksaan_rutin {
        require_positive(freq, "freq_pemeriksaan_rutin")?;
    }
    require_animal(state.repo.as_ref(), id).await?;
    let schedule = state.repo.create_exam_schedule(id, &payload).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

#[utoipa::path(
    put,
    path = "/protected/hewan/{id}/jadwal-pemeriksaan/{tanggal}",
    params(
        ("id" = Uuid, Path, description = "Animal ID"),
        ("tanggal" = NaiveDate, Path, description = "Scheduled date (YYYY-MM-DD)")
    ),
    request_body = UpdateExamScheduleRequest,
    responses((status = 200, description = "Updated", body = ExamSchedule))
)]
pub async fn update_exam_schedule(
    session: Session,
    State(state): State<AppState>,
    Path((id, tanggal)): Path<(Uuid, NaiveDate)>,
    Json(payload): Json<UpdateExamScheduleRequest>,
) -> Result<Json<ExamSchedule>, ApiError> {
    session.require(&[Role::DokterHewan])?;
    if let Some(freq) = payload.freq_pemeriksaan_rutin {
        require_positive(freq, "freq_pemeriksaan_rutin")?;
    }
    let schedule = state
        .repo
        .update_exam_schedule(id, tanggal, &payload)
        .await?;
    Ok(Json(schedule))
}

#[utoipa::path(
    delete,
    path = "/protected/hewan/{id}/jadwal-pemeriksaan/{tanggal}",
    params(
        ("id" = Uuid, Path, description = "Animal ID"),
        ("tanggal" = NaiveDate, Path, description = "Scheduled date (YYYY-MM-DD)")
    ),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_exam_schedule(
    session: Session,
    State(state): State<AppState>,
    Path((id, tanggal)): Path<(Uuid, NaiveDate)>,
) -> Result<StatusCode, ApiError> {
    session.require(&[Role::DokterHewan])?;
    state.repo.delete_exam_schedule(id, tanggal).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Feeding (animal keeper) ---

#[utoipa::path(
    get,
    path = "/protected/hewan/{id}/pakan",
    params(("id" = Uuid, Path, description = "Animal ID")),
    responses((status = 200, description = "Feeding schedule", body = [Feeding]))
)]
pub async fn list_feedings(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Feeding>>, ApiError> {
    session.require(&[Role::PenjagaHewan])?;
    require_animal(state.repo.as_ref(), id).await?;
    Ok(Json(state.repo.list_feedings(id).await))
}

/// create_feeding
///
/// [Authenticated Route] Adds a feeding slot. New slots start as `Menunggu Pemberian`.
#[utoipa::path(
    post,
    path = "/protected/hewan/{id}/pakan",
    params(("id" = Uuid, Path, description = "Animal ID")),
    request_body = CreateFeedingRequest,
    responses((status = 201, description = "Created", body = Feeding))
)]
pub async fn create_feeding(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateFeedingRequest>,
) -> Result<(StatusCode, Json<Feeding>), ApiError> {
    session.require(&[Role::PenjagaHewan])?;
    require_text(&payload.jenis, "jenis")?;
    require_positive(payload.jumlah, "jumlah")?;
    require_animal(state.repo.as_ref(), id).await?;
    let feeding = state.repo.create_feeding(id, &payload).await?;
    Ok((StatusCode::CREATED, Json(feeding)))
}

#[utoipa::path(
    put,
    path = "/protected/hewan/{id}/pakan/{jadwal}",
    params(
        ("id" = Uuid, Path, description = "Animal ID"),
        ("jadwal" = NaiveDateTime, Path, description = "Feeding time (YYYY-MM-DDTHH:MM:SS)")
    ),
    request_body = UpdateFeedingRequest,
    responses((status = 200, description = "Updated", body = Feeding))
)]
pub async fn update_feeding(
    session: Session,
    State(state): State<AppState>,
    Path((id, jadwal)): Path<(Uuid, NaiveDateTime)>,
    Json(payload): Json<UpdateFeedingRequest>,
) -> Result<Json<Feeding>, ApiError> {
    session.require(&[Role::PenjagaHewan])?;
    optional_text(payload.jenis.as_deref(), "jenis")?;
    if let Some(jumlah) = payload.jumlah {
        require_positive(jumlah, "jumlah")?;
    }
    let feeding = state.repo.update_feeding(id, jadwal, &payload).await?;
    Ok(Json(feeding))
}

#[utoipa::path(
    delete,
    path = "/protected/hewan/{id}/pakan/{jadwal}",
    params(
        ("id" = Uuid, Path, description = "Animal ID"),
        ("jadwal" = NaiveDateTime, Path, description = "Feeding time (YYYY-MM-DDTHH:MM:SS)")
    ),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_feeding(
    session: Session,
    State(state): State<AppState>,
    Path((id, jadwal)): Path<(Uuid, NaiveDateTime)>,
) -> Result<StatusCode, ApiError> {
    session.require(&[Role::PenjagaHewan])?;
    state.repo.delete_feeding(id, jadwal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// mark_fed
///
/// [Authenticated Route] Marks the slot `Selesai Diberikan` and records the calling
/// keeper as the one who fed the animal.
#[utoipa::path(
    post,
    path = "/protected/hewan/{id}/pakan/{jadwal}/beri",
    params(
        ("id" = Uuid, Path, description = "Animal ID"),
        ("jadwal" = NaiveDateTime, Path, description = "Feeding time (YYYY-MM-DDTHH:MM:SS)")
    ),
    responses((status = 200, description = "Fed", body = Feeding), (status = 404, description = "Not Found"))
)]
pub async fn mark_fed(
    session: Session,
    State(state): State<AppState>,
    Path((id, jadwal)): Path<(Uuid, NaiveDateTime)>,
) -> Result<Json<Feeding>, ApiError> {
    session.require(&[Role::PenjagaHewan])?;
    let feeding = state.repo.mark_fed(id, jadwal, &session.username).await?;
    tracing::info!(id_hewan = %id, keeper = %session.username, "animal fed");
    Ok(Json(feeding))
}
