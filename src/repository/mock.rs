use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{RepoError, Repository};
use crate::models::{
    AdopterKind, AdopterRow, AdopterSummary, Adoption, Animal, CreateAdopterRequest,
    CreateAdoptionRequest, CreateExamScheduleRequest, CreateFeedingRequest,
    CreateMedicalRecordRequest, CreateReservationRequest, ExamSchedule, FEEDING_DONE,
    FEEDING_PENDING, Feeding, MedicalRecord, PAYMENT_PENDING, RESERVATION_CANCELLED,
    RESERVATION_SCHEDULED, Registration, Reservation, Role, ShowAssignment, StaffRow,
    TicketSummary, UpdateExamScheduleRequest, UpdateFeedingRequest, UpdateMedicalRecordRequest,
    UpdateProfileRequest, UpdateReservationRequest, User, VeterinarianRow, VisitorRow,
};

#[derive(Default)]
struct MockData {
    users: Vec<User>,
    visitors: Vec<VisitorRow>,
    adopters: Vec<AdopterRow>,
    adopter_kinds: Vec<(Uuid, AdopterKind)>,
    veterinarians: Vec<VeterinarianRow>,
    // (username_sh, nama_spesialisasi)
    specializations: Vec<(String, String)>,
    keepers: Vec<StaffRow>,
    admins: Vec<StaffRow>,
    trainers: Vec<StaffRow>,
    animals: Vec<Animal>,
    medical_records: Vec<MedicalRecord>,
    exam_schedules: Vec<ExamSchedule>,
    feedings: Vec<Feeding>,
    // (id_hewan, jadwal, username_jh)
    fed_by: Vec<(Uuid, NaiveDateTime, String)>,
    reservations: Vec<Reservation>,
    adoptions: Vec<Adoption>,
    assignments: Vec<ShowAssignment>,

    procedure_roles: HashMap<String, Option<String>>,
    medical_notice: Option<String>,
    register_error: Option<String>,
    register_calls: usize,
    failing_counters: bool,
}

/// MockRepository
///
/// In-memory `Repository` used by the test suite and by local experiments without a
/// database. Seed it with the `with_*` builders; the trait methods mimic the keys,
/// defaults and rejections of the Postgres schema closely enough for handler tests.
#[derive(Default)]
pub struct MockRepository {
    data: Mutex<MockData>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Seeding ---

    pub fn with_user(self, user: User) -> Self {
        self.lock().users.push(user);
        self
    }

    pub fn with_visitor(self, username: &str, alamat: &str, tgl_lahir: NaiveDate) -> Self {
        self.lock().visitors.push(VisitorRow {
            username_p: username.to_string(),
            alamat: alamat.to_string(),
            tgl_lahir,
        });
        self
    }

    pub fn with_adopter(self, username: &str, id_adopter: Uuid, total_kontribusi: i64) -> Self {
        self.lock().adopters.push(AdopterRow {
            id_adopter,
            username_adopter: username.to_string(),
            total_kontribusi,
        });
        self
    }

    pub fn with_veterinarian(self, username: &str, no_str: &str, spesialisasi: &[&str]) -> Self {
        {
            let mut data = self.lock();
            data.veterinarians.push(VeterinarianRow {
                username_dh: username.to_string(),
                no_str: no_str.to_string(),
            });
            for s in spesialisasi {
                data.specializations.push((username.to_string(), s.to_string()));
            }
        }
        self
    }

    pub fn with_keeper(self, username: &str, id_staf: Uuid) -> Self {
        self.lock().keepers.push(staff(username, id_staf));
        self
    }

    pub fn with_admin(self, username: &str, id_staf: Uuid) -> Self {
        self.lock().admins.push(staff(username, id_staf));
        self
    }

    pub fn with_trainer(self, username: &str, id_staf: Uuid) -> Self {
        self.lock().trainers.push(staff(username, id_staf));
        self
    }

    pub fn with_animal(self, animal: Animal) -> Self {
        self.lock().animals.push(animal);
        self
    }

    pub fn with_medical_record(self, record: MedicalRecord) -> Self {
        self.lock().medical_records.push(record);
        self
    }

    pub fn with_feeding(self, feeding: Feeding) -> Self {
        self.lock().feedings.push(feeding);
        self
    }

    pub fn with_fed_by(self, id_hewan: Uuid, jadwal: NaiveDateTime, username_jh: &str) -> Self {
        self.lock().fed_by.push((id_hewan, jadwal, username_jh.to_string()));
        self
    }

    pub fn with_reservation(self, reservation: Reservation) -> Self {
        self.lock().reservations.push(reservation);
        self
    }

    pub fn with_adoption(self, adoption: Adoption) -> Self {
        self.lock().adoptions.push(adoption);
        self
    }

    pub fn with_assignment(self, assignment: ShowAssignment) -> Self {
        self.lock().assignments.push(assignment);
        self
    }

    /// Overrides what `get_user_role` reports for `username`. Without an override the
    /// mock derives the answer from the marker rows.
    pub fn with_procedure_role(self, username: &str, role: Option<&str>) -> Self {
        self.lock()
            .procedure_roles
            .insert(username.to_string(), role.map(str::to_string));
        self
    }

    /// Notice returned by the medical-record procedure on the next inserts.
    pub fn with_medical_notice(self, notice: &str) -> Self {
        self.lock().medical_notice = Some(notice.to_string());
        self
    }

    /// Makes `register_user` fail as if the procedure raised `message`.
    pub fn with_register_error(self, message: &str) -> Self {
        self.lock().register_error = Some(message.to_string());
        self
    }

    /// Makes every dashboard counter fail.
    pub fn with_failing_counters(self) -> Self {
        self.lock().failing_counters = true;
        self
    }

    // --- Inspection ---

    pub fn register_calls(&self) -> usize {
        self.lock().register_calls
    }

    pub fn stored_password(&self, username: &str) -> Option<String> {
        self.lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.password.clone())
    }

    pub fn fed_by(&self, id_hewan: Uuid) -> Vec<String> {
        self.lock()
            .fed_by
            .iter()
            .filter(|(id, _, _)| *id == id_hewan)
            .map(|(_, _, who)| who.clone())
            .collect()
    }
}

fn staff(username: &str, id_staf: Uuid) -> StaffRow {
    StaffRow {
        username: username.to_string(),
        id_staf,
    }
}

impl MockData {
    fn has_user(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username == username)
    }

    fn has_animal(&self, id: Uuid) -> bool {
        self.animals.iter().any(|a| a.id == id)
    }

    fn derived_role(&self, username: &str) -> Option<String> {
        let role = if self.visitors.iter().any(|v| v.username_p == username) {
            if self.adopters.iter().any(|a| a.username_adopter == username) {
                Role::Adopter
            } else {
                Role::Pengunjung
            }
        } else if self.veterinarians.iter().any(|v| v.username_dh == username) {
            Role::DokterHewan
        } else if self.keepers.iter().any(|s| s.username == username) {
            Role::PenjagaHewan
        } else if self.admins.iter().any(|s| s.username == username) {
            Role::StafAdmin
        } else if self.trainers.iter().any(|s| s.username == username) {
            Role::PelatihHewan
        } else {
            return None;
        };
        Some(role.as_str().to_string())
    }

    fn with_animal_name(&self, mut adoption: Adoption) -> Adoption {
        adoption.nama_hewan = self
            .animals
            .iter()
            .find(|a| a.id == adoption.id_hewan)
            .and_then(|a| a.nama.clone());
        adoption
    }
}

fn missing_reference() -> RepoError {
    RepoError::Rejected("referenced record does not exist".to_string())
}

fn duplicate() -> RepoError {
    RepoError::Conflict("record already exists".to_string())
}

#[async_trait]
impl Repository for MockRepository {
    // --- Users & Credentials ---

    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.lock().users.iter().find(|u| u.username == username).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.lock().users.iter().find(|u| u.email == email).cloned()
    }

    async fn register_user(&self, reg: &Registration, password_hash: &str) -> Result<(), RepoError> {
        let mut data = self.lock();
        data.register_calls += 1;

        if let Some(message) = &data.register_error {
            return Err(RepoError::Rejected(message.clone()));
        }
        if data.has_user(&reg.username) {
            return Err(RepoError::Rejected(format!(
                "Username {} is already registered",
                reg.username
            )));
        }
        if data.users.iter().any(|u| u.email == reg.email) {
            return Err(RepoError::Rejected(format!("Email {} is already registered", reg.email)));
        }

        data.users.push(User {
            username: reg.username.clone(),
            email: reg.email.clone(),
            password: password_hash.to_string(),
            hashed_password: Some(password_hash.to_string()),
            nama_depan: reg.nama_depan.clone(),
            nama_tengah: reg.nama_tengah.clone(),
            nama_belakang: reg.nama_belakang.clone(),
            no_telepon: reg.no_telepon.clone(),
        });

        match reg.role {
            Role::Pengunjung | Role::Adopter => data.visitors.push(VisitorRow {
                username_p: reg.username.clone(),
                alamat: reg.alamat.clone().unwrap_or_default(),
                tgl_lahir: reg.tgl_lahir.unwrap_or_default(),
            }),
            Role::DokterHewan => {
                data.veterinarians.push(VeterinarianRow {
                    username_dh: reg.username.clone(),
                    no_str: reg.no_str.clone().unwrap_or_default(),
                });
                for s in &reg.spesialisasi {
                    data.specializations.push((reg.username.clone(), s.clone()));
                }
            }
            Role::PenjagaHewan => data
                .keepers
                .push(staff(&reg.username, reg.id_staf.unwrap_or_else(Uuid::new_v4))),
            Role::StafAdmin => data
                .admins
                .push(staff(&reg.username, reg.id_staf.unwrap_or_else(Uuid::new_v4))),
            Role::PelatihHewan => data
                .trainers
                .push(staff(&reg.username, reg.id_staf.unwrap_or_else(Uuid::new_v4))),
        }
        Ok(())
    }

    async fn procedure_role(&self, username: &str) -> Option<String> {
        let data = self.lock();
        match data.procedure_roles.get(username) {
            Some(role) => role.clone(),
            None => data.derived_role(username),
        }
    }

    async fn update_profile(&self, username: &str, role: Role, req: &UpdateProfileRequest) -> Result<(), RepoError> {
        let mut data = self.lock();
        let touches_visitor = role.is_visitor() && (req.alamat.is_some() || req.tgl_lahir.is_some());

        // Check every target row before writing so a failure changes nothing.
        let user_idx = data
            .users
            .iter()
            .position(|u| u.username == username)
            .ok_or(RepoError::NotFound("user"))?;
        let visitor_idx = if touches_visitor {
            Some(
                data.visitors
                    .iter()
                    .position(|v| v.username_p == username)
                    .ok_or(RepoError::NotFound("visitor"))?,
            )
        } else {
            None
        };

        let user = &mut data.users[user_idx];
        if let Some(v) = &req.nama_depan {
            user.nama_depan = v.clone();
        }
        if let Some(v) = &req.nama_tengah {
            user.nama_tengah = Some(v.clone());
        }
        if let Some(v) = &req.nama_belakang {
            user.nama_belakang = v.clone();
        }
        if let Some(v) = &req.no_telepon {
            user.no_telepon = v.clone();
        }

        if let Some(idx) = visitor_idx {
            let visitor = &mut data.visitors[idx];
            if let Some(a) = &req.alamat {
                visitor.alamat = a.clone();
            }
            if let Some(d) = req.tgl_lahir {
                visitor.tgl_lahir = d;
            }
        }

        if let (Role::DokterHewan, Some(spesialisasi)) = (role, &req.spesialisasi) {
            data.specializations.retain(|(u, _)| u != username);
            for s in spesialisasi {
                data.specializations.push((username.to_string(), s.clone()));
            }
        }
        Ok(())
    }

    async fn set_password_hash(&self, username: &str, hash: &str) -> Result<(), RepoError> {
        let mut data = self.lock();
        let user = data
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or(RepoError::NotFound("user"))?;
        user.password = hash.to_string();
        user.hashed_password = Some(hash.to_string());
        Ok(())
    }

    // --- Role Markers ---

    async fn find_visitor(&self, username: &str) -> Option<VisitorRow> {
        self.lock().visitors.iter().find(|v| v.username_p == username).cloned()
    }

    async fn find_adopter(&self, username: &str) -> Option<AdopterRow> {
        self.lock()
            .adopters
            .iter()
            .find(|a| a.username_adopter == username)
            .cloned()
    }

    async fn find_veterinarian(&self, username: &str) -> Option<VeterinarianRow> {
        self.lock()
            .veterinarians
            .iter()
            .find(|v| v.username_dh == username)
            .cloned()
    }

    async fn get_specializations(&self, username: &str) -> Vec<String> {
        self.lock()
            .specializations
            .iter()
            .filter(|(u, _)| u == username)
            .map(|(_, s)| s.clone())
            .collect()
    }

    async fn find_keeper(&self, username: &str) -> Option<StaffRow> {
        self.lock().keepers.iter().find(|s| s.username == username).cloned()
    }

    async fn find_admin(&self, username: &str) -> Option<StaffRow> {
        self.lock().admins.iter().find(|s| s.username == username).cloned()
    }

    async fn find_trainer(&self, username: &str) -> Option<StaffRow> {
        self.lock().trainers.iter().find(|s| s.username == username).cloned()
    }

    // --- Dashboard Counters ---

    async fn count_treated_animals(&self, username_dh: &str) -> Option<i64> {
        let data = self.lock();
        if data.failing_counters {
            return None;
        }
        let mut ids: Vec<Uuid> = data
            .medical_records
            .iter()
            .filter(|r| r.username_dh == username_dh)
            .map(|r| r.id_hewan)
            .collect();
        ids.sort();
        ids.dedup();
        Some(ids.len() as i64)
    }

    async fn count_fed_animals(&self, username_jh: &str) -> Option<i64> {
        let data = self.lock();
        if data.failing_counters {
            return None;
        }
        let mut ids: Vec<Uuid> = data
            .fed_by
            .iter()
            .filter(|(_, _, who)| who == username_jh)
            .map(|(id, _, _)| *id)
            .collect();
        ids.sort();
        ids.dedup();
        Some(ids.len() as i64)
    }

    async fn ticket_summary(&self, date: NaiveDate) -> Option<TicketSummary> {
        let data = self.lock();
        if data.failing_counters {
            return None;
        }
        let todays: Vec<&Reservation> = data
            .reservations
            .iter()
            .filter(|r| r.tanggal_kunjungan == date && r.status != RESERVATION_CANCELLED)
            .collect();
        let mut visitors: Vec<&str> = todays.iter().map(|r| r.username_p.as_str()).collect();
        visitors.sort();
        visitors.dedup();
        Some(TicketSummary {
            tiket_terjual: todays.iter().map(|r| i64::from(r.jumlah_tiket)).sum(),
            jumlah_pengunjung: visitors.len() as i64,
        })
    }

    // --- Animals ---

    async fn list_animals(&self) -> Vec<Animal> {
        self.lock().animals.clone()
    }

    async fn get_animal(&self, id: Uuid) -> Option<Animal> {
        self.lock().animals.iter().find(|a| a.id == id).cloned()
    }

    // --- Medical Records ---

    async fn list_medical_records(&self, id_hewan: Uuid) -> Vec<MedicalRecord> {
        let mut records: Vec<MedicalRecord> = self
            .lock()
            .medical_records
            .iter()
            .filter(|r| r.id_hewan == id_hewan)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.tanggal_pemeriksaan.cmp(&a.tanggal_pemeriksaan));
        records
    }

    async fn create_medical_record(
        &self,
        id_hewan: Uuid,
        username_dh: &str,
        req: &CreateMedicalRecordRequest,
    ) -> Result<Option<String>, RepoError> {
        let mut data = self.lock();
        if !data.has_animal(id_hewan) {
            return Err(missing_reference());
        }
        if data
            .medical_records
            .iter()
            .any(|r| r.id_hewan == id_hewan && r.tanggal_pemeriksaan == req.tanggal_pemeriksaan)
        {
            return Err(duplicate());
        }
        data.medical_records.push(MedicalRecord {
            id_hewan,
            username_dh: username_dh.to_string(),
            tanggal_pemeriksaan: req.tanggal_pemeriksaan,
            diagnosis: req.diagnosis.clone(),
            pengobatan: req.pengobatan.clone(),
            status_kesehatan: req.status_kesehatan.clone(),
            catatan_tindak_lanjut: req.catatan_tindak_lanjut.clone(),
        });
        Ok(data.medical_notice.clone())
    }

    async fn update_medical_record(
        &self,
        id_hewan: Uuid,
        tanggal: NaiveDate,
        req: &UpdateMedicalRecordRequest,
    ) -> Result<MedicalRecord, RepoError> {
        let mut data = self.lock();
        let record = data
            .medical_records
            .iter_mut()
            .find(|r| r.id_hewan == id_hewan && r.tanggal_pemeriksaan == tanggal)
            .ok_or(RepoError::NotFound("medical record"))?;
        if req.diagnosis.is_some() {
            record.diagnosis = req.diagnosis.clone();
        }
        if req.pengobatan.is_some() {
            record.pengobatan = req.pengobatan.clone();
        }
        if req.catatan_tindak_lanjut.is_some() {
            record.catatan_tindak_lanjut = req.catatan_tindak_lanjut.clone();
        }
        Ok(record.clone())
    }

    async fn delete_medical_record(&self, id_hewan: Uuid, tanggal: NaiveDate) -> Result<(), RepoError> {
        let mut data = self.lock();
        let before = data.medical_records.len();
        data.medical_records
            .retain(|r| !(r.id_hewan == id_hewan && r.tanggal_pemeriksaan == tanggal));
        if data.medical_records.len() == before {
            return Err(RepoError::NotFound("medical record"));
        }
        Ok(())
    }

    // --- Examination Schedules ---

    async fn list_exam_schedules(&self, id_hewan: Uuid) -> Vec<ExamSchedule> {
        let mut schedules: Vec<ExamSchedule> = self
            .lock()
            .exam_schedules
            .iter()
            .filter(|s| s.id_hewan == id_hewan)
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.tgl_pemeriksaan_selanjutnya);
        schedules
    }

    async fn create_exam_schedule(
        &self,
        id_hewan: Uuid,
        req: &CreateExamScheduleRequest,
    ) -> Result<ExamSchedule, RepoError> {
        let mut data = self.lock();
        if !data.has_animal(id_hewan) {
            return Err(missing_reference());
        }
        if data
            .exam_schedules
            .iter()
            .any(|s| s.id_hewan == id_hewan && s.tgl_pemeriksaan_selanjutnya == req.tgl_pemeriksaan_selanjutnya)
        {
            return Err(duplicate());
        }
        let schedule = ExamSchedule {
            id_hewan,
            tgl_pemeriksaan_selanjutnya: req.tgl_pemeriksaan_selanjutnya,
            freq_pemeriksaan_rutin: req.freq_pemeriksaan_rutin.unwrap_or(3),
        };
        data.exam_schedules.push(schedule.clone());
        Ok(schedule)
    }

    async fn update_exam_schedule(
        &self,
        id_hewan: Uuid,
        tanggal: NaiveDate,
        req: &UpdateExamScheduleRequest,
    ) -> Result<ExamSchedule, RepoError> {
        let mut data = self.lock();
        let schedule = data
            .exam_schedules
            .iter_mut()
            .find(|s| s.id_hewan == id_hewan && s.tgl_pemeriksaan_selanjutnya == tanggal)
            .ok_or(RepoError::NotFound("examination schedule"))?;
        if let Some(d) = req.tgl_pemeriksaan_selanjutnya {
            schedule.tgl_pemeriksaan_selanjutnya = d;
        }
        if let Some(f) = req.freq_pemeriksaan_rutin {
            schedule.freq_pemeriksaan_rutin = f;
        }
        Ok(schedule.clone())
    }

    async fn delete_exam_schedule(&self, id_hewan: Uuid, tanggal: NaiveDate) -> Result<(), RepoError> {
        let mut data = self.lock();
        let before = data.exam_schedules.len();
        data.exam_schedules
            .retain(|s| !(s.id_hewan == id_hewan && s.tgl_pemeriksaan_selanjutnya == tanggal));
        if data.exam_schedules.len() == before {
            return Err(RepoError::NotFound("examination schedule"));
        }
        Ok(())
    }

    // --- Feeding ---

    async fn list_feedings(&self, id_hewan: Uuid) -> Vec<Feeding> {
        let mut feedings: Vec<Feeding> = self
            .lock()
            .feedings
            .iter()
            .filter(|f| f.id_hewan == id_hewan)
            .cloned()
            .collect();
        feedings.sort_by(|a, b| b.jadwal.cmp(&a.jadwal));
        feedings
    }

    async fn create_feeding(&self, id_hewan: Uuid, req: &CreateFeedingRequest) -> Result<Feeding, RepoError> {
        let mut data = self.lock();
        if !data.has_animal(id_hewan) {
            return Err(missing_reference());
        }
        if data.feedings.iter().any(|f| f.id_hewan == id_hewan && f.jadwal == req.jadwal) {
            return Err(duplicate());
        }
        let feeding = Feeding {
            id_hewan,
            jadwal: req.jadwal,
            jenis: req.jenis.clone(),
            jumlah: req.jumlah,
            status: FEEDING_PENDING.to_string(),
        };
        data.feedings.push(feeding.clone());
        Ok(feeding)
    }

    async fn update_feeding(
        &self,
        id_hewan: Uuid,
        jadwal: NaiveDateTime,
        req: &UpdateFeedingRequest,
    ) -> Result<Feeding, RepoError> {
        let mut data = self.lock();
        let feeding = data
            .feedings
            .iter_mut()
            .find(|f| f.id_hewan == id_hewan && f.jadwal == jadwal)
            .ok_or(RepoError::NotFound("feeding"))?;
        if let Some(j) = &req.jenis {
            feeding.jenis = j.clone();
        }
        if let Some(n) = req.jumlah {
            feeding.jumlah = n;
        }
        Ok(feeding.clone())
    }

    async fn delete_feeding(&self, id_hewan: Uuid, jadwal: NaiveDateTime) -> Result<(), RepoError> {
        let mut data = self.lock();
        let before = data.feedings.len();
        data.feedings.retain(|f| !(f.id_hewan == id_hewan && f.jadwal == jadwal));
        if data.feedings.len() == before {
            return Err(RepoError::NotFound("feeding"));
        }
        Ok(())
    }

    async fn mark_fed(&self, id_hewan: Uuid, jadwal: NaiveDateTime, username_jh: &str) -> Result<Feeding, RepoError> {
        let mut data = self.lock();
        let feeding = {
            let feeding = data
                .feedings
                .iter_mut()
                .find(|f| f.id_hewan == id_hewan && f.jadwal == jadwal)
                .ok_or(RepoError::NotFound("feeding"))?;
            feeding.status = FEEDING_DONE.to_string();
            feeding.clone()
        };
        if !data
            .fed_by
            .iter()
            .any(|(id, j, who)| *id == id_hewan && *j == jadwal && who == username_jh)
        {
            data.fed_by.push((id_hewan, jadwal, username_jh.to_string()));
        }
        Ok(feeding)
    }

    // --- Reservations ---

    async fn list_reservations_for(&self, username_p: &str) -> Vec<Reservation> {
        let mut reservations: Vec<Reservation> = self
            .lock()
            .reservations
            .iter()
            .filter(|r| r.username_p == username_p)
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.tanggal_kunjungan.cmp(&a.tanggal_kunjungan));
        reservations
    }

    async fn list_all_reservations(&self) -> Vec<Reservation> {
        let mut reservations = self.lock().reservations.clone();
        reservations.sort_by(|a, b| {
            b.tanggal_kunjungan
                .cmp(&a.tanggal_kunjungan)
                .then_with(|| a.username_p.cmp(&b.username_p))
        });
        reservations
    }

    async fn create_reservation(
        &self,
        username_p: &str,
        req: &CreateReservationRequest,
    ) -> Result<Reservation, RepoError> {
        let mut data = self.lock();
        if data.reservations.iter().any(|r| {
            r.username_p == username_p
                && r.nama_fasilitas == req.nama_fasilitas
                && r.tanggal_kunjungan == req.tanggal_kunjungan
        }) {
            return Err(duplicate());
        }
        let reservation = Reservation {
            username_p: username_p.to_string(),
            nama_fasilitas: req.nama_fasilitas.clone(),
            tanggal_kunjungan: req.tanggal_kunjungan,
            jumlah_tiket: req.jumlah_tiket,
            status: RESERVATION_SCHEDULED.to_string(),
        };
        data.reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn update_reservation(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
        req: &UpdateReservationRequest,
    ) -> Result<Reservation, RepoError> {
        let mut data = self.lock();
        let reservation = data
            .reservations
            .iter_mut()
            .find(|r| {
                r.username_p == username_p
                    && r.nama_fasilitas == nama_fasilitas
                    && r.tanggal_kunjungan == tanggal
                    && r.status == RESERVATION_SCHEDULED
            })
            .ok_or(RepoError::NotFound("reservation"))?;
        if let Some(d) = req.tanggal_kunjungan {
            reservation.tanggal_kunjungan = d;
        }
        if let Some(n) = req.jumlah_tiket {
            reservation.jumlah_tiket = n;
        }
        Ok(reservation.clone())
    }

    async fn cancel_reservation(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
    ) -> Result<Reservation, RepoError> {
        let mut data = self.lock();
        let reservation = data
            .reservations
            .iter_mut()
            .find(|r| {
                r.username_p == username_p
                    && r.nama_fasilitas == nama_fasilitas
                    && r.tanggal_kunjungan == tanggal
                    && r.status == RESERVATION_SCHEDULED
            })
            .ok_or(RepoError::NotFound("reservation"))?;
        reservation.status = RESERVATION_CANCELLED.to_string();
        Ok(reservation.clone())
    }

    async fn set_reservation_status(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
        status: &str,
    ) -> Result<Reservation, RepoError> {
        let mut data = self.lock();
        let reservation = data
            .reservations
            .iter_mut()
            .find(|r| {
                r.username_p == username_p && r.nama_fasilitas == nama_fasilitas && r.tanggal_kunjungan == tanggal
            })
            .ok_or(RepoError::NotFound("reservation"))?;
        reservation.status = status.to_string();
        Ok(reservation.clone())
    }

    // --- Adopters & Adoptions ---

    async fn list_adopters(&self) -> Vec<AdopterSummary> {
        let data = self.lock();
        let mut adopters: Vec<AdopterSummary> = data
            .adopters
            .iter()
            .map(|a| {
                let kind = data
                    .adopter_kinds
                    .iter()
                    .find(|(id, _)| *id == a.id_adopter)
                    .map(|(_, k)| k);
                let (nama, jenis) = match kind {
                    Some(AdopterKind::Individu { nama, .. }) => (nama.clone(), "individu"),
                    Some(AdopterKind::Organisasi { nama_organisasi, .. }) => {
                        (nama_organisasi.clone(), "organisasi")
                    }
                    None => (a.username_adopter.clone(), "organisasi"),
                };
                AdopterSummary {
                    id_adopter: a.id_adopter,
                    username_adopter: a.username_adopter.clone(),
                    nama,
                    jenis: jenis.to_string(),
                    total_kontribusi: a.total_kontribusi,
                }
            })
            .collect();
        adopters.sort_by(|a, b| {
            b.total_kontribusi
                .cmp(&a.total_kontribusi)
                .then_with(|| a.username_adopter.cmp(&b.username_adopter))
        });
        adopters
    }

    async fn create_adopter(&self, req: &CreateAdopterRequest) -> Result<AdopterSummary, RepoError> {
        let mut data = self.lock();
        if !data.visitors.iter().any(|v| v.username_p == req.username) {
            return Err(missing_reference());
        }
        if data.adopters.iter().any(|a| a.username_adopter == req.username) {
            return Err(duplicate());
        }
        let id_adopter = Uuid::new_v4();
        data.adopters.push(AdopterRow {
            id_adopter,
            username_adopter: req.username.clone(),
            total_kontribusi: 0,
        });
        data.adopter_kinds.push((id_adopter, req.adopter.clone()));

        let (nama, jenis) = match &req.adopter {
            AdopterKind::Individu { nama, .. } => (nama.clone(), "individu"),
            AdopterKind::Organisasi { nama_organisasi, .. } => (nama_organisasi.clone(), "organisasi"),
        };
        Ok(AdopterSummary {
            id_adopter,
            username_adopter: req.username.clone(),
            nama,
            jenis: jenis.to_string(),
            total_kontribusi: 0,
        })
    }

    async fn list_adoptions(&self) -> Vec<Adoption> {
        let data = self.lock();
        data.adoptions
            .iter()
            .cloned()
            .map(|a| data.with_animal_name(a))
            .collect()
    }

    async fn list_adoptions_for_adopter(&self, id_adopter: Uuid) -> Vec<Adoption> {
        let data = self.lock();
        data.adoptions
            .iter()
            .filter(|a| a.id_adopter == id_adopter)
            .cloned()
            .map(|a| data.with_animal_name(a))
            .collect()
    }

    async fn create_adoption(&self, req: &CreateAdoptionRequest) -> Result<Adoption, RepoError> {
        let mut data = self.lock();
        if !data.has_animal(req.id_hewan) || !data.adopters.iter().any(|a| a.id_adopter == req.id_adopter) {
            return Err(missing_reference());
        }
        if data
            .adoptions
            .iter()
            .any(|a| a.id_adopter == req.id_adopter && a.id_hewan == req.id_hewan)
        {
            return Err(duplicate());
        }
        let adoption = Adoption {
            id_adopter: req.id_adopter,
            id_hewan: req.id_hewan,
            nama_hewan: None,
            status_pembayaran: PAYMENT_PENDING.to_string(),
            tgl_mulai_adopsi: req.tgl_mulai_adopsi,
            tgl_berhenti_adopsi: req.tgl_berhenti_adopsi,
            kontribusi_finansial: req.kontribusi_finansial,
        };
        data.adoptions.push(adoption.clone());
        Ok(adoption)
    }

    async fn set_adoption_payment(
        &self,
        id_adopter: Uuid,
        id_hewan: Uuid,
        status_pembayaran: &str,
    ) -> Result<Adoption, RepoError> {
        let mut data = self.lock();
        let adoption = data
            .adoptions
            .iter_mut()
            .find(|a| a.id_adopter == id_adopter && a.id_hewan == id_hewan)
            .ok_or(RepoError::NotFound("adoption"))?;
        adoption.status_pembayaran = status_pembayaran.to_string();
        Ok(adoption.clone())
    }

    async fn delete_adoption(&self, id_adopter: Uuid, id_hewan: Uuid) -> Result<(), RepoError> {
        let mut data = self.lock();
        let before = data.adoptions.len();
        data.adoptions
            .retain(|a| !(a.id_adopter == id_adopter && a.id_hewan == id_hewan));
        if data.adoptions.len() == before {
            return Err(RepoError::NotFound("adoption"));
        }
        Ok(())
    }

    // --- Shows ---

    async fn list_assignments(&self, username_lh: &str) -> Vec<ShowAssignment> {
        let mut assignments: Vec<ShowAssignment> = self
            .lock()
            .assignments
            .iter()
            .filter(|a| a.username_lh == username_lh)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| a.tgl_penugasan);
        assignments
    }
}
