use crate::{AppState, handlers::care, handlers::visits};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Staff Router Module
///
/// Record keeping for veterinarians and keepers, and the administration screens. Nested
/// under `/protected` with the same session layer; each handler checks the role it needs.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        // --- Veterinarian: medical records ---
        .route(
            "/hewan/{id}/catatan-medis",
            get(care::list_medical_records).post(care::create_medical_record),
        )
        .route(
            "/hewan/{id}/catatan-medis/{tanggal}",
            put(care::update_medical_record).delete(care::delete_medical_record),
        )
        // --- Veterinarian: examination schedules ---
        .route(
            "/hewan/{id}/jadwal-pemeriksaan",
            get(care::list_exam_schedules).post(care::create_exam_schedule),
        )
        .route(
            "/hewan/{id}/jadwal-pemeriksaan/{tanggal}",
            put(care::update_exam_schedule).delete(care::delete_exam_schedule),
        )
        // --- Animal keeper: feeding ---
        .route(
            "/hewan/{id}/pakan",
            get(care::list_feedings).post(care::create_feeding),
        )
        .route(
            "/hewan/{id}/pakan/{jadwal}",
            put(care::update_feeding).delete(care::delete_feeding),
        )
        // POST .../beri
        // Marks the slot done and records the keeper in one transaction.
        .route("/hewan/{id}/pakan/{jadwal}/beri", post(care::mark_fed))
        // --- Admin ---
        .route("/admin/reservasi", get(visits::list_all_reservations))
        .route(
            "/admin/reservasi/{username}/{fasilitas}/{tanggal}/status",
            put(visits::set_reservation_status),
        )
        .route(
            "/admin/adopter",
            get(visits::list_adopters).post(visits::create_adopter),
        )
        .route(
            "/admin/adopsi",
            get(visits::list_adoptions).post(visits::create_adoption),
        )
        .route(
            "/admin/adopsi/{id_adopter}/{id_hewan}/pembayaran",
            put(visits::set_adoption_payment),
        )
        .route(
            "/admin/adopsi/{id_adopter}/{id_hewan}",
            axum::routing::delete(visits::delete_adoption),
        )
}
