use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Status vocabularies (stored verbatim in the database) ---

pub const HEALTH_STATUSES: [&str; 3] = ["Sehat", "Sakit", "Dalam Pemantauan"];
pub const PAYMENT_STATUSES: [&str; 2] = ["Tertunda", "Lunas"];
pub const RESERVATION_STATUSES: [&str; 3] = ["Terjadwal", "Dibatalkan", "Selesai"];

pub const FEEDING_PENDING: &str = "Menunggu Pemberian";
pub const FEEDING_DONE: &str = "Selesai Diberikan";
pub const RESERVATION_SCHEDULED: &str = "Terjadwal";
pub const RESERVATION_CANCELLED: &str = "Dibatalkan";
pub const PAYMENT_PENDING: &str = "Tertunda";

// --- Identity (pengguna + role marker tables) ---

/// User
///
/// A row of `pengguna`. Password columns never leave the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    // Present for accounts whose password was set after hashing was wired in.
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub nama_depan: String,
    pub nama_tengah: Option<String>,
    pub nama_belakang: String,
    pub no_telepon: String,
}

impl User {
    pub fn nama_lengkap(&self) -> String {
        [
            Some(self.nama_depan.as_str()),
            self.nama_tengah.as_deref(),
            Some(self.nama_belakang.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Row of `pengunjung`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct VisitorRow {
    pub username_p: String,
    pub alamat: String,
    pub tgl_lahir: NaiveDate,
}

/// Row of `adopter`. The subtype (individu/organisasi) lives in child tables.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct AdopterRow {
    pub id_adopter: Uuid,
    pub username_adopter: String,
    pub total_kontribusi: i64,
}

/// Row of `dokter_hewan`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct VeterinarianRow {
    pub username_dh: String,
    pub no_str: String,
}

/// StaffRow
///
/// Shared shape of `penjaga_hewan`, `staf_admin` and `pelatih_hewan`; queries alias the
/// table-specific username column to `username`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct StaffRow {
    pub username: String,
    pub id_staf: Uuid,
}

// --- Roles ---

/// Role
///
/// The role tag carried by a session. `Adopter` is a refinement of `Pengunjung`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Pengunjung,
    Adopter,
    DokterHewan,
    PenjagaHewan,
    StafAdmin,
    PelatihHewan,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Pengunjung => "pengunjung",
            Role::Adopter => "adopter",
            Role::DokterHewan => "dokter_hewan",
            Role::PenjagaHewan => "penjaga_hewan",
            Role::StafAdmin => "staf_admin",
            Role::PelatihHewan => "pelatih_hewan",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value.trim() {
            "pengunjung" => Some(Role::Pengunjung),
            "adopter" => Some(Role::Adopter),
            "dokter_hewan" => Some(Role::DokterHewan),
            "penjaga_hewan" => Some(Role::PenjagaHewan),
            "staf_admin" => Some(Role::StafAdmin),
            "pelatih_hewan" => Some(Role::PelatihHewan),
            _ => None,
        }
    }

    /// Post-login redirect target.
    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Role::Pengunjung | Role::Adopter => "/protected/dashboard/pengunjung",
            Role::DokterHewan => "/protected/dashboard/dokter-hewan",
            Role::PenjagaHewan => "/protected/dashboard/penjaga-hewan",
            Role::StafAdmin => "/protected/dashboard/staf-administrasi",
            Role::PelatihHewan => "/protected/dashboard/staf-pelatih",
        }
    }

    pub fn is_visitor(&self) -> bool {
        matches!(self, Role::Pengunjung | Role::Adopter)
    }
}

/// ResolvedRole
///
/// Output of the role resolver: the role tag plus the role-specific payload captured
/// while probing. Serialised with a `role` tag, e.g.
/// `{"role":"adopter","alamat":"...","tgl_lahir":"2000-01-01"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
#[ts(export)]
pub enum ResolvedRole {
    Pengunjung { alamat: String, tgl_lahir: NaiveDate },
    Adopter { alamat: String, tgl_lahir: NaiveDate },
    DokterHewan { no_str: String, spesialisasi: Vec<String> },
    PenjagaHewan { id_staf: Uuid },
    StafAdmin { id_staf: Uuid },
    PelatihHewan { id_staf: Uuid },
}

impl ResolvedRole {
    pub fn role(&self) -> Role {
        match self {
            ResolvedRole::Pengunjung { .. } => Role::Pengunjung,
            ResolvedRole::Adopter { .. } => Role::Adopter,
            ResolvedRole::DokterHewan { .. } => Role::DokterHewan,
            ResolvedRole::PenjagaHewan { .. } => Role::PenjagaHewan,
            ResolvedRole::StafAdmin { .. } => Role::StafAdmin,
            ResolvedRole::PelatihHewan { .. } => Role::PelatihHewan,
        }
    }
}

// --- Auth Payloads (form-encoded) ---

/// SignInRequest
///
/// `identifier` is a username, or an email when it contains `@`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct SignInRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

/// SignUpRequest
///
/// Raw sign-up form. Every field is a string so that malformed input reaches
/// validation (and its redirect) instead of failing extraction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct SignUpRequest {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub nama_depan: String,
    pub nama_tengah: Option<String>,
    #[serde(default)]
    pub nama_belakang: String,
    #[serde(default)]
    pub no_telepon: String,
    pub alamat: Option<String>,
    pub tgl_lahir: Option<String>,
    pub no_str: Option<String>,
    /// Comma-separated list, e.g. "Reptil, Primata".
    pub spesialisasi: Option<String>,
}

/// Registration
///
/// A validated sign-up, ready for `register_user_with_role`.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub role: Role,
    pub username: String,
    pub email: String,
    pub password: String,
    pub nama_depan: String,
    pub nama_tengah: Option<String>,
    pub nama_belakang: String,
    pub no_telepon: String,
    pub alamat: Option<String>,
    pub tgl_lahir: Option<NaiveDate>,
    pub no_str: Option<String>,
    pub spesialisasi: Vec<String>,
    pub id_staf: Option<Uuid>,
}

/// Input for `PUT /protected/profil`. Role-specific fields are ignored for other roles.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    pub nama_depan: Option<String>,
    pub nama_tengah: Option<String>,
    pub nama_belakang: Option<String>,
    pub no_telepon: Option<String>,
    pub alamat: Option<String>,
    pub tgl_lahir: Option<NaiveDate>,
    pub spesialisasi: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// --- Profile View Models (Output) ---

/// Fields every dashboard shows, flattened into each role profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ProfileBase {
    pub username: String,
    pub email: String,
    pub nama_lengkap: String,
    pub no_telepon: String,
}

impl From<&User> for ProfileBase {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            nama_lengkap: user.nama_lengkap(),
            no_telepon: user.no_telepon.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct AdopterDetails {
    pub id_adopter: Uuid,
    pub total_kontribusi: i64,
    pub hewan_diadopsi: Vec<Adoption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct VisitorProfile {
    #[serde(flatten)]
    pub base: ProfileBase,
    pub alamat: String,
    pub tgl_lahir: NaiveDate,
    pub riwayat_reservasi: Vec<Reservation>,
    // Present only when the visitor is also an adopter.
    pub adopter: Option<AdopterDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct VeterinarianProfile {
    #[serde(flatten)]
    pub base: ProfileBase,
    pub no_str: String,
    pub spesialisasi: Vec<String>,
    pub jumlah_hewan_ditangani: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct KeeperProfile {
    #[serde(flatten)]
    pub base: ProfileBase,
    pub id_staf: Uuid,
    pub jumlah_hewan_diberi_pakan: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct AdminProfile {
    #[serde(flatten)]
    pub base: ProfileBase,
    pub id_staf: Uuid,
    pub penjualan_tiket_hari_ini: i64,
    pub jumlah_pengunjung_hari_ini: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct TrainerProfile {
    #[serde(flatten)]
    pub base: ProfileBase,
    pub id_staf: Uuid,
    pub jadwal_hari_ini: Vec<ShowAssignment>,
    pub total_penugasan: i64,
}

/// Profile
///
/// Whichever role profile the session resolves to, tagged by `role`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Profile {
    Pengunjung(VisitorProfile),
    Adopter(VisitorProfile),
    DokterHewan(VeterinarianProfile),
    PenjagaHewan(KeeperProfile),
    StafAdmin(AdminProfile),
    PelatihHewan(TrainerProfile),
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct TicketSummary {
    pub tiket_terjual: i64,
    pub jumlah_pengunjung: i64,
}

// --- Sanctuary Records ---

/// Row of `hewan`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Animal {
    pub id: Uuid,
    pub nama: Option<String>,
    pub spesies: String,
    pub asal_hewan: String,
    pub tanggal_lahir: Option<NaiveDate>,
    pub status_kesehatan: String,
    pub nama_habitat: Option<String>,
    pub url_foto: Option<String>,
}

/// Row of `catatan_medis`, keyed by (`id_hewan`, `tanggal_pemeriksaan`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct MedicalRecord {
    pub id_hewan: Uuid,
    pub username_dh: String,
    pub tanggal_pemeriksaan: NaiveDate,
    pub diagnosis: Option<String>,
    pub pengobatan: Option<String>,
    pub status_kesehatan: String,
    pub catatan_tindak_lanjut: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateMedicalRecordRequest {
    pub tanggal_pemeriksaan: NaiveDate,
    pub diagnosis: Option<String>,
    pub pengobatan: Option<String>,
    pub status_kesehatan: String,
    pub catatan_tindak_lanjut: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateMedicalRecordRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pengobatan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catatan_tindak_lanjut: Option<String>,
}

/// Response of a medical record insert; `notice` carries whatever the trigger reported.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MedicalRecordCreated {
    pub record: MedicalRecord,
    pub notice: Option<String>,
}

/// Row of `jadwal_pemeriksaan_kesehatan`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ExamSchedule {
    pub id_hewan: Uuid,
    pub tgl_pemeriksaan_selanjutnya: NaiveDate,
    pub freq_pemeriksaan_rutin: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateExamScheduleRequest {
    pub tgl_pemeriksaan_selanjutnya: NaiveDate,
    // Months between routine checks; defaults to 3.
    pub freq_pemeriksaan_rutin: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateExamScheduleRequest {
    pub tgl_pemeriksaan_selanjutnya: Option<NaiveDate>,
    pub freq_pemeriksaan_rutin: Option<i32>,
}

/// Row of `pakan`, keyed by (`id_hewan`, `jadwal`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Feeding {
    pub id_hewan: Uuid,
    pub jadwal: NaiveDateTime,
    pub jenis: String,
    pub jumlah: i32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateFeedingRequest {
    pub jadwal: NaiveDateTime,
    pub jenis: String,
    pub jumlah: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateFeedingRequest {
    pub jenis: Option<String>,
    pub jumlah: Option<i32>,
}

/// Row of `reservasi`, keyed by (`username_p`, `nama_fasilitas`, `tanggal_kunjungan`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Reservation {
    pub username_p: String,
    pub nama_fasilitas: String,
    pub tanggal_kunjungan: NaiveDate,
    pub jumlah_tiket: i32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateReservationRequest {
    pub nama_fasilitas: String,
    pub tanggal_kunjungan: NaiveDate,
    pub jumlah_tiket: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateReservationRequest {
    pub tanggal_kunjungan: Option<NaiveDate>,
    pub jumlah_tiket: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateReservationStatusRequest {
    pub status: String,
}

/// Row of `adopsi`, optionally joined with the animal's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Adoption {
    pub id_adopter: Uuid,
    pub id_hewan: Uuid,
    #[sqlx(default)]
    pub nama_hewan: Option<String>,
    pub status_pembayaran: String,
    pub tgl_mulai_adopsi: NaiveDate,
    pub tgl_berhenti_adopsi: NaiveDate,
    pub kontribusi_finansial: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAdoptionRequest {
    pub id_adopter: Uuid,
    pub id_hewan: Uuid,
    pub tgl_mulai_adopsi: NaiveDate,
    pub tgl_berhenti_adopsi: NaiveDate,
    pub kontribusi_finansial: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePaymentStatusRequest {
    pub status_pembayaran: String,
}

/// AdopterKind
///
/// Which subtype table (`individu` or `organisasi`) backs an adopter.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(tag = "jenis", rename_all = "snake_case")]
#[ts(export)]
pub enum AdopterKind {
    Individu { nik: String, nama: String },
    Organisasi { npp: String, nama_organisasi: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateAdopterRequest {
    /// Must already be a visitor.
    pub username: String,
    pub adopter: AdopterKind,
}

/// An adopter joined with its subtype row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct AdopterSummary {
    pub id_adopter: Uuid,
    pub username_adopter: String,
    pub nama: String,
    // "individu" | "organisasi"
    pub jenis: String,
    pub total_kontribusi: i64,
}

/// Row of `jadwal_penugasan`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ShowAssignment {
    pub username_lh: String,
    pub tgl_penugasan: NaiveDateTime,
    pub nama_atraksi: String,
}
