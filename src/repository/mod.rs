use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    AdopterRow, AdopterSummary, Adoption, Animal, CreateAdopterRequest, CreateAdoptionRequest,
    CreateExamScheduleRequest, CreateFeedingRequest, CreateMedicalRecordRequest,
    CreateReservationRequest, ExamSchedule, Feeding, MedicalRecord, Registration, Reservation,
    Role, ShowAssignment, StaffRow, TicketSummary, UpdateExamScheduleRequest, UpdateFeedingRequest,
    UpdateMedicalRecordRequest, UpdateProfileRequest, UpdateReservationRequest, User,
    VeterinarianRow, VisitorRow,
};

mod mock;
mod postgres;

pub use mock::MockRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Failure of a write. Reads never return this: they log and fall back to `None` or an
/// empty list, so "missing" and "lookup failed" look the same to callers.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Unique-key violation.
    #[error("{0}")]
    Conflict(String),
    /// A procedure, trigger or foreign key refused the write with a user-facing reason.
    #[error("{0}")]
    Rejected(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.code().as_deref() {
                Some("23505") => return RepoError::Conflict("record already exists".to_string()),
                Some("23503") => {
                    return RepoError::Rejected("referenced record does not exist".to_string());
                }
                // RAISE EXCEPTION inside register_user_with_role and the record triggers.
                Some("P0001") => return RepoError::Rejected(db.message().to_string()),
                _ => {}
            }
        }
        RepoError::Database(err)
    }
}

/// Repository Trait
///
/// Abstract contract for every persistence operation the handlers and the auth
/// services perform. `Send + Sync + async_trait` make `Arc<dyn Repository>` usable
/// across axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users & Credentials ---
    async fn find_user_by_username(&self, username: &str) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    // Calls the register_user_with_role procedure; the password argument is already hashed.
    async fn register_user(&self, reg: &Registration, password_hash: &str) -> Result<(), RepoError>;
    // Server-side role lookup (get_user_role), used as a secondary check at sign-in.
    async fn procedure_role(&self, username: &str) -> Option<String>;
    // pengguna, then pengunjung (visitor roles) and spesialisasi (veterinarians), in one
    // transaction. `req.spesialisasi` arrives already cleaned.
    async fn update_profile(&self, username: &str, role: Role, req: &UpdateProfileRequest) -> Result<(), RepoError>;
    async fn set_password_hash(&self, username: &str, hash: &str) -> Result<(), RepoError>;

    // --- Role Markers ---
    async fn find_visitor(&self, username: &str) -> Option<VisitorRow>;
    async fn find_adopter(&self, username: &str) -> Option<AdopterRow>;
    async fn find_veterinarian(&self, username: &str) -> Option<VeterinarianRow>;
    async fn get_specializations(&self, username: &str) -> Vec<String>;
    async fn find_keeper(&self, username: &str) -> Option<StaffRow>;
    async fn find_admin(&self, username: &str) -> Option<StaffRow>;
    async fn find_trainer(&self, username: &str) -> Option<StaffRow>;

    // --- Dashboard Counters ---
    // `None` means the query itself failed; callers abort the aggregation.
    async fn count_treated_animals(&self, username_dh: &str) -> Option<i64>;
    async fn count_fed_animals(&self, username_jh: &str) -> Option<i64>;
    async fn ticket_summary(&self, date: NaiveDate) -> Option<TicketSummary>;

    // --- Animals ---
    async fn list_animals(&self) -> Vec<Animal>;
    async fn get_animal(&self, id: Uuid) -> Option<Animal>;

    // --- Medical Records (veterinarian) ---
    async fn list_medical_records(&self, id_hewan: Uuid) -> Vec<MedicalRecord>;
    // Goes through insert_medical_record_with_trigger; returns the trigger's notice, if any.
    async fn create_medical_record(
        &self,
        id_hewan: Uuid,
        username_dh: &str,
        req: &CreateMedicalRecordRequest,
    ) -> Result<Option<String>, RepoError>;
    async fn update_medical_record(
        &self,
        id_hewan: Uuid,
        tanggal: NaiveDate,
        req: &UpdateMedicalRecordRequest,
    ) -> Result<MedicalRecord, RepoError>;
    async fn delete_medical_record(&self, id_hewan: Uuid, tanggal: NaiveDate) -> Result<(), RepoError>;

    // --- Examination Schedules (veterinarian) ---
    async fn list_exam_schedules(&self, id_hewan: Uuid) -> Vec<ExamSchedule>;
    async fn create_exam_schedule(
        &self,
        id_hewan: Uuid,
        req: &CreateExamScheduleRequest,
    ) -> Result<ExamSchedule, RepoError>;
    async fn update_exam_schedule(
        &self,
        id_hewan: Uuid,
        tanggal: NaiveDate,
        req: &UpdateExamScheduleRequest,
    ) -> Result<ExamSchedule, RepoError>;
    async fn delete_exam_schedule(&self, id_hewan: Uuid, tanggal: NaiveDate) -> Result<(), RepoError>;

    // --- Feeding (animal keeper) ---
    async fn list_feedings(&self, id_hewan: Uuid) -> Vec<Feeding>;
    async fn create_feeding(&self, id_hewan: Uuid, req: &CreateFeedingRequest) -> Result<Feeding, RepoError>;
    async fn update_feeding(
        &self,
        id_hewan: Uuid,
        jadwal: NaiveDateTime,
        req: &UpdateFeedingRequest,
    ) -> Result<Feeding, RepoError>;
    async fn delete_feeding(&self, id_hewan: Uuid, jadwal: NaiveDateTime) -> Result<(), RepoError>;
    // Marks the feeding done and records who gave it (pakan + memberi, one transaction).
    async fn mark_fed(&self, id_hewan: Uuid, jadwal: NaiveDateTime, username_jh: &str) -> Result<Feeding, RepoError>;

    // --- Reservations ---
    async fn list_reservations_for(&self, username_p: &str) -> Vec<Reservation>;
    async fn list_all_reservations(&self) -> Vec<Reservation>;
    async fn create_reservation(
        &self,
        username_p: &str,
        req: &CreateReservationRequest,
    ) -> Result<Reservation, RepoError>;
    async fn update_reservation(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
        req: &UpdateReservationRequest,
    ) -> Result<Reservation, RepoError>;
    // Terjadwal -> Dibatalkan; NotFound when the row is missing or no longer scheduled.
    async fn cancel_reservation(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
    ) -> Result<Reservation, RepoError>;
    async fn set_reservation_status(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
        status: &str,
    ) -> Result<Reservation, RepoError>;

    // --- Adopters & Adoptions ---
    async fn list_adopters(&self) -> Vec<AdopterSummary>;
    // adopter + individu/organisasi rows in one transaction.
    async fn create_adopter(&self, req: &CreateAdopterRequest) -> Result<AdopterSummary, RepoError>;
    async fn list_adoptions(&self) -> Vec<Adoption>;
    async fn list_adoptions_for_adopter(&self, id_adopter: Uuid) -> Vec<Adoption>;
    async fn create_adoption(&self, req: &CreateAdoptionRequest) -> Result<Adoption, RepoError>;
    async fn set_adoption_payment(
        &self,
        id_adopter: Uuid,
        id_hewan: Uuid,
        status_pembayaran: &str,
    ) -> Result<Adoption, RepoError>;
    async fn delete_adoption(&self, id_adopter: Uuid, id_hewan: Uuid) -> Result<(), RepoError>;

    // --- Shows (trainer) ---
    async fn list_assignments(&self, username_lh: &str) -> Vec<ShowAssignment>;
}

/// RepositoryState
///
/// The type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
