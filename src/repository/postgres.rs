use crate::models::{
    AdopterKind, AdopterRow, AdopterSummary, Adoption, Animal, CreateAdopterRequest,
    CreateAdoptionRequest, CreateExamScheduleRequest, CreateFeedingRequest,
    CreateMedicalRecordRequest, CreateReservationRequest, ExamSchedule, FEEDING_DONE,
    FEEDING_PENDING, Feeding, MedicalRecord, PAYMENT_PENDING, RESERVATION_CANCELLED,
    RESERVATION_SCHEDULED, Registration, Reservation, Role, ShowAssignment, StaffRow,
    TicketSummary, UpdateExamScheduleRequest, UpdateFeedingRequest, UpdateMedicalRecordRequest,
    UpdateProfileRequest, UpdateReservationRequest, User, VeterinarianRow, VisitorRow,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepoError, Repository};

/// PostgresRepository
///
/// `Repository` backed by the sanctuary's PostgreSQL database. Table names are
/// unqualified; the pool sets `search_path` to the configured schema on connect.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_staff(&self, sql: &str, username: &str, what: &str) -> Option<StaffRow> {
        sqlx::query_as::<_, StaffRow>(sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("find_{} error: {:?}", what, e);
                None
            })
    }

    async fn count(&self, sql: &str, username: &str, what: &str) -> Option<i64> {
        match sqlx::query_scalar::<_, i64>(sql)
            .bind(username)
            .fetch_one(&self.pool)
            .await
        {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::error!("{} error: {:?}", what, e);
                None
            }
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS & CREDENTIALS ---

    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            r#"SELECT username, email, password, hashed_password, nama_depan, nama_tengah,
                      nama_belakang, no_telepon
               FROM pengguna WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_user_by_username error: {:?}", e);
            None
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            r#"SELECT username, email, password, hashed_password, nama_depan, nama_tengah,
                      nama_belakang, no_telepon
               FROM pengguna WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_user_by_email error: {:?}", e);
            None
        })
    }

    /// register_user
    ///
    /// The procedure creates `pengguna` plus the role marker (and specializations) atomically.
    /// `hashed_password` is written in the same transaction.
    async fn register_user(&self, reg: &Registration, password_hash: &str) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"SELECT register_user_with_role($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#,
        )
        .bind(&reg.username)
        .bind(&reg.email)
        .bind(password_hash)
        .bind(&reg.nama_depan)
        .bind(&reg.nama_tengah)
        .bind(&reg.nama_belakang)
        .bind(&reg.no_telepon)
        .bind(reg.role.as_str())
        .bind(&reg.alamat)
        .bind(reg.tgl_lahir)
        .bind(&reg.no_str)
        .bind(&reg.spesialisasi)
        .bind(reg.id_staf)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE pengguna SET hashed_password = $2 WHERE username = $1")
            .bind(&reg.username)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn procedure_role(&self, username: &str) -> Option<String> {
        sqlx::query_scalar::<_, Option<String>>("SELECT get_user_role($1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user_role error: {:?}", e);
                None
            })
    }

    /// update_profile
    ///
    /// `COALESCE` keeps columns whose request field is `None`. Every statement runs in
    /// one transaction, so a missing `pengunjung` row leaves `pengguna` untouched.
    async fn update_profile(&self, username: &str, role: Role, req: &UpdateProfileRequest) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        let res = sqlx::query(
            r#"UPDATE pengguna
               SET nama_depan = COALESCE($2, nama_depan),
                   nama_tengah = COALESCE($3, nama_tengah),
                   nama_belakang = COALESCE($4, nama_belakang),
                   no_telepon = COALESCE($5, no_telepon)
               WHERE username = $1"#,
        )
        .bind(username)
        .bind(&req.nama_depan)
        .bind(&req.nama_tengah)
        .bind(&req.nama_belakang)
        .bind(&req.no_telepon)
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("user"));
        }

        if role.is_visitor() && (req.alamat.is_some() || req.tgl_lahir.is_some()) {
            let res = sqlx::query(
                r#"UPDATE pengunjung
                   SET alamat = COALESCE($2, alamat), tgl_lahir = COALESCE($3, tgl_lahir)
                   WHERE username_p = $1"#,
            )
            .bind(username)
            .bind(&req.alamat)
            .bind(req.tgl_lahir)
            .execute(&mut *tx)
            .await?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound("visitor"));
            }
        }

        if let (Role::DokterHewan, Some(spesialisasi)) = (role, &req.spesialisasi) {
            sqlx::query("DELETE FROM spesialisasi WHERE username_sh = $1")
                .bind(username)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO spesialisasi (username_sh, nama_spesialisasi) SELECT $1, unnest($2::text[])",
            )
            .bind(username)
            .bind(spesialisasi)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn set_password_hash(&self, username: &str, hash: &str) -> Result<(), RepoError> {
        let res = sqlx::query(
            "UPDATE pengguna SET password = $2, hashed_password = $2 WHERE username = $1",
        )
        .bind(username)
        .bind(hash)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("user"));
        }
        Ok(())
    }

    // --- ROLE MARKERS ---

    async fn find_visitor(&self, username: &str) -> Option<VisitorRow> {
        sqlx::query_as::<_, VisitorRow>(
            "SELECT username_p, alamat, tgl_lahir FROM pengunjung WHERE username_p = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_visitor error: {:?}", e);
            None
        })
    }

    async fn find_adopter(&self, username: &str) -> Option<AdopterRow> {
        sqlx::query_as::<_, AdopterRow>(
            "SELECT id_adopter, username_adopter, total_kontribusi FROM adopter WHERE username_adopter = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_adopter error: {:?}", e);
            None
        })
    }

    async fn find_veterinarian(&self, username: &str) -> Option<VeterinarianRow> {
        sqlx::query_as::<_, VeterinarianRow>(
            "SELECT username_dh, no_str FROM dokter_hewan WHERE username_dh = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_veterinarian error: {:?}", e);
            None
        })
    }

    async fn get_specializations(&self, username: &str) -> Vec<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT nama_spesialisasi FROM spesialisasi WHERE username_sh = $1",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_specializations error: {:?}", e);
            vec![]
        })
    }

    async fn find_keeper(&self, username: &str) -> Option<StaffRow> {
        self.find_staff(
            "SELECT username_jh AS username, id_staf FROM penjaga_hewan WHERE username_jh = $1",
            username,
            "keeper",
        )
        .await
    }

    async fn find_admin(&self, username: &str) -> Option<StaffRow> {
        self.find_staff(
            "SELECT username_sa AS username, id_staf FROM staf_admin WHERE username_sa = $1",
            username,
            "admin",
        )
        .await
    }

    async fn find_trainer(&self, username: &str) -> Option<StaffRow> {
        self.find_staff(
            "SELECT username_lh AS username, id_staf FROM pelatih_hewan WHERE username_lh = $1",
            username,
            "trainer",
        )
        .await
    }

    // --- DASHBOARD COUNTERS ---

    async fn count_treated_animals(&self, username_dh: &str) -> Option<i64> {
        self.count(
            "SELECT COUNT(DISTINCT id_hewan) FROM catatan_medis WHERE username_dh = $1",
            username_dh,
            "count_treated_animals",
        )
        .await
    }

    async fn count_fed_animals(&self, username_jh: &str) -> Option<i64> {
        self.count(
            "SELECT COUNT(DISTINCT id_hewan) FROM memberi WHERE username_jh = $1",
            username_jh,
            "count_fed_animals",
        )
        .await
    }

    /// ticket_summary
    ///
    /// Tickets and distinct visitors for one day, excluding cancelled reservations.
    async fn ticket_summary(&self, date: NaiveDate) -> Option<TicketSummary> {
        match sqlx::query_as::<_, TicketSummary>(
            r#"SELECT COALESCE(SUM(jumlah_tiket), 0)::BIGINT AS tiket_terjual,
                      COUNT(DISTINCT username_p) AS jumlah_pengunjung
               FROM reservasi
               WHERE tanggal_kunjungan = $1 AND status <> 'Dibatalkan'"#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!("ticket_summary error: {:?}", e);
                None
            }
        }
    }

    // --- ANIMALS ---

    async fn list_animals(&self) -> Vec<Animal> {
        sqlx::query_as::<_, Animal>(
            r#"SELECT id, nama, spesies, asal_hewan, tanggal_lahir, status_kesehatan,
                      nama_habitat, url_foto
               FROM hewan ORDER BY nama NULLS LAST, spesies"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_animals error: {:?}", e);
            vec![]
        })
    }

    async fn get_animal(&self, id: Uuid) -> Option<Animal> {
        sqlx::query_as::<_, Animal>(
            r#"SELECT id, nama, spesies, asal_hewan, tanggal_lahir, status_kesehatan,
                      nama_habitat, url_foto
               FROM hewan WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_animal error: {:?}", e);
            None
        })
    }

    // --- MEDICAL RECORDS ---

    async fn list_medical_records(&self, id_hewan: Uuid) -> Vec<MedicalRecord> {
        sqlx::query_as::<_, MedicalRecord>(
            r#"SELECT id_hewan, username_dh, tanggal_pemeriksaan, diagnosis, pengobatan,
                      status_kesehatan, catatan_tindak_lanjut
               FROM catatan_medis WHERE id_hewan = $1
               ORDER BY tanggal_pemeriksaan DESC"#,
        )
        .bind(id_hewan)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_medical_records error: {:?}", e);
            vec![]
        })
    }

    /// create_medical_record
    ///
    /// The procedure inserts the record and lets the table trigger react to the health
    /// status (e.g. rescheduling the next examination for a sick animal). Its text result
    /// is that trigger's notice.
    async fn create_medical_record(
        &self,
        id_hewan: Uuid,
        username_dh: &str,
        req: &CreateMedicalRecordRequest,
    ) -> Result<Option<String>, RepoError> {
        let notice = sqlx::query_scalar::<_, Option<String>>(
            "SELECT insert_medical_record_with_trigger($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id_hewan)
        .bind(username_dh)
        .bind(req.tanggal_pemeriksaan)
        .bind(&req.diagnosis)
        .bind(&req.pengobatan)
        .bind(&req.status_kesehatan)
        .bind(&req.catatan_tindak_lanjut)
        .fetch_one(&self.pool)
        .await?;
        Ok(notice)
    }

    async fn update_medical_record(
        &self,
        id_hewan: Uuid,
        tanggal: NaiveDate,
        req: &UpdateMedicalRecordRequest,
    ) -> Result<MedicalRecord, RepoError> {
        sqlx::query_as::<_, MedicalRecord>(
            r#"UPDATE catatan_medis
               SET diagnosis = COALESCE($3, diagnosis),
                   pengobatan = COALESCE($4, pengobatan),
                   catatan_tindak_lanjut = COALESCE($5, catatan_tindak_lanjut)
               WHERE id_hewan = $1 AND tanggal_pemeriksaan = $2
               RETURNING id_hewan, username_dh, tanggal_pemeriksaan, diagnosis, pengobatan,
                         status_kesehatan, catatan_tindak_lanjut"#,
        )
        .bind(id_hewan)
        .bind(tanggal)
        .bind(&req.diagnosis)
        .bind(&req.pengobatan)
        .bind(&req.catatan_tindak_lanjut)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("medical record"))
    }

    async fn delete_medical_record(&self, id_hewan: Uuid, tanggal: NaiveDate) -> Result<(), RepoError> {
        let res = sqlx::query("DELETE FROM catatan_medis WHERE id_hewan = $1 AND tanggal_pemeriksaan = $2")
            .bind(id_hewan)
            .bind(tanggal)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("medical record"));
        }
        Ok(())
    }

    // --- EXAMINATION SCHEDULES ---

    async fn list_exam_schedules(&self, id_hewan: Uuid) -> Vec<ExamSchedule> {
        sqlx::query_as::<_, ExamSchedule>(
            r#"SELECT id_hewan, tgl_pemeriksaan_selanjutnya, freq_pemeriksaan_rutin
               FROM jadwal_pemeriksaan_kesehatan WHERE id_hewan = $1
               ORDER BY tgl_pemeriksaan_selanjutnya"#,
        )
        .bind(id_hewan)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_exam_schedules error: {:?}", e);
            vec![]
        })
    }

    async fn create_exam_schedule(
        &self,
        id_hewan: Uuid,
        req: &CreateExamScheduleRequest,
    ) -> Result<ExamSchedule, RepoError> {
        let schedule = sqlx::query_as::<_, ExamSchedule>(
            r#"INSERT INTO jadwal_pemeriksaan_kesehatan
                   (id_hewan, tgl_pemeriksaan_selanjutnya, freq_pemeriksaan_rutin)
               VALUES ($1, $2, $3)
               RETURNING id_hewan, tgl_pemeriksaan_selanjutnya, freq_pemeriksaan_rutin"#,
        )
        .bind(id_hewan)
        .bind(req.tgl_pemeriksaan_selanjutnya)
        .bind(req.freq_pemeriksaan_rutin.unwrap_or(3))
        .fetch_one(&self.pool)
        .await?;
        Ok(schedule)
    }

    async fn update_exam_schedule(
        &self,
        id_hewan: Uuid,
        tanggal: NaiveDate,
        req: &UpdateExamScheduleRequest,
    ) -> Result<ExamSchedule, RepoError> {
        sqlx::query_as::<_, ExamSchedule>(
            r#"UPDATE jadwal_pemeriksaan_kesehatan
               SET tgl_pemeriksaan_selanjutnya = COALESCE($3, tgl_pemeriksaan_selanjutnya),
                   freq_pemeriksaan_rutin = COALESCE($4, freq_pemeriksaan_rutin)
               WHERE id_hewan = $1 AND tgl_pemeriksaan_selanjutnya = $2
               RETURNING id_hewan, tgl_pemeriksaan_selanjutnya, freq_pemeriksaan_rutin"#,
        )
        .bind(id_hewan)
        .bind(tanggal)
        .bind(req.tgl_pemeriksaan_selanjutnya)
        .bind(req.freq_pemeriksaan_rutin)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("examination schedule"))
    }

    async fn delete_exam_schedule(&self, id_hewan: Uuid, tanggal: NaiveDate) -> Result<(), RepoError> {
        let res = sqlx::query(
            "DELETE FROM jadwal_pemeriksaan_kesehatan WHERE id_hewan = $1 AND tgl_pemeriksaan_selanjutnya = $2",
        )
        .bind(id_hewan)
        .bind(tanggal)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("examination schedule"));
        }
        Ok(())
    }

    // --- FEEDING ---

    async fn list_feedings(&self, id_hewan: Uuid) -> Vec<Feeding> {
        sqlx::query_as::<_, Feeding>(
            "SELECT id_hewan, jadwal, jenis, jumlah, status FROM pakan WHERE id_hewan = $1 ORDER BY jadwal DESC",
        )
        .bind(id_hewan)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_feedings error: {:?}", e);
            vec![]
        })
    }

    async fn create_feeding(&self, id_hewan: Uuid, req: &CreateFeedingRequest) -> Result<Feeding, RepoError> {
        let feeding = sqlx::query_as::<_, Feeding>(
            r#"INSERT INTO pakan (id_hewan, jadwal, jenis, jumlah, status)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id_hewan, jadwal, jenis, jumlah, status"#,
        )
        .bind(id_hewan)
        .bind(req.jadwal)
        .bind(&req.jenis)
        .bind(req.jumlah)
        .bind(FEEDING_PENDING)
        .fetch_one(&self.pool)
        .await?;
        Ok(feeding)
    }

    async fn update_feeding(
        &self,
        id_hewan: Uuid,
        jadwal: NaiveDateTime,
        req: &UpdateFeedingRequest,
    ) -> Result<Feeding, RepoError> {
        sqlx::query_as::<_, Feeding>(
            r#"UPDATE pakan
               SET jenis = COALESCE($3, jenis), jumlah = COALESCE($4, jumlah)
               WHERE id_hewan = $1 AND jadwal = $2
               RETURNING id_hewan, jadwal, jenis, jumlah, status"#,
        )
        .bind(id_hewan)
        .bind(jadwal)
        .bind(&req.jenis)
        .bind(req.jumlah)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("feeding"))
    }

    async fn delete_feeding(&self, id_hewan: Uuid, jadwal: NaiveDateTime) -> Result<(), RepoError> {
        let res = sqlx::query("DELETE FROM pakan WHERE id_hewan = $1 AND jadwal = $2")
            .bind(id_hewan)
            .bind(jadwal)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("feeding"));
        }
        Ok(())
    }

    async fn mark_fed(&self, id_hewan: Uuid, jadwal: NaiveDateTime, username_jh: &str) -> Result<Feeding, RepoError> {
        let mut tx = self.pool.begin().await?;

        let feeding = sqlx::query_as::<_, Feeding>(
            r#"UPDATE pakan SET status = $3
               WHERE id_hewan = $1 AND jadwal = $2
               RETURNING id_hewan, jadwal, jenis, jumlah, status"#,
        )
        .bind(id_hewan)
        .bind(jadwal)
        .bind(FEEDING_DONE)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepoError::NotFound("feeding"))?;

        sqlx::query(
            r#"INSERT INTO memberi (id_hewan, jadwal, username_jh) VALUES ($1, $2, $3)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(id_hewan)
        .bind(jadwal)
        .bind(username_jh)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(feeding)
    }

    // --- RESERVATIONS ---

    async fn list_reservations_for(&self, username_p: &str) -> Vec<Reservation> {
        sqlx::query_as::<_, Reservation>(
            r#"SELECT username_p, nama_fasilitas, tanggal_kunjungan, jumlah_tiket, status
               FROM reservasi WHERE username_p = $1 ORDER BY tanggal_kunjungan DESC"#,
        )
        .bind(username_p)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_reservations_for error: {:?}", e);
            vec![]
        })
    }

    async fn list_all_reservations(&self) -> Vec<Reservation> {
        sqlx::query_as::<_, Reservation>(
            r#"SELECT username_p, nama_fasilitas, tanggal_kunjungan, jumlah_tiket, status
               FROM reservasi ORDER BY tanggal_kunjungan DESC, username_p"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_all_reservations error: {:?}", e);
            vec![]
        })
    }

    async fn create_reservation(
        &self,
        username_p: &str,
        req: &CreateReservationRequest,
    ) -> Result<Reservation, RepoError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"INSERT INTO reservasi (username_p, nama_fasilitas, tanggal_kunjungan, jumlah_tiket, status)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING username_p, nama_fasilitas, tanggal_kunjungan, jumlah_tiket, status"#,
        )
        .bind(username_p)
        .bind(&req.nama_fasilitas)
        .bind(req.tanggal_kunjungan)
        .bind(req.jumlah_tiket)
        .bind(RESERVATION_SCHEDULED)
        .fetch_one(&self.pool)
        .await?;
        Ok(reservation)
    }

    /// update_reservation
    ///
    /// Only reservations still `Terjadwal` can be edited.
    async fn update_reservation(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
        req: &UpdateReservationRequest,
    ) -> Result<Reservation, RepoError> {
        sqlx::query_as::<_, Reservation>(
            r#"UPDATE reservasi
               SET tanggal_kunjungan = COALESCE($4, tanggal_kunjungan),
                   jumlah_tiket = COALESCE($5, jumlah_tiket)
               WHERE username_p = $1 AND nama_fasilitas = $2 AND tanggal_kunjungan = $3
                 AND status = $6
               RETURNING username_p, nama_fasilitas, tanggal_kunjungan, jumlah_tiket, status"#,
        )
        .bind(username_p)
        .bind(nama_fasilitas)
        .bind(tanggal)
        .bind(req.tanggal_kunjungan)
        .bind(req.jumlah_tiket)
        .bind(RESERVATION_SCHEDULED)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("reservation"))
    }

    async fn cancel_reservation(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
    ) -> Result<Reservation, RepoError> {
        sqlx::query_as::<_, Reservation>(
            r#"UPDATE reservasi SET status = $5
               WHERE username_p = $1 AND nama_fasilitas = $2 AND tanggal_kunjungan = $3
                 AND status = $4
               RETURNING username_p, nama_fasilitas, tanggal_kunjungan, jumlah_tiket, status"#,
        )
        .bind(username_p)
        .bind(nama_fasilitas)
        .bind(tanggal)
        .bind(RESERVATION_SCHEDULED)
        .bind(RESERVATION_CANCELLED)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("reservation"))
    }

    async fn set_reservation_status(
        &self,
        username_p: &str,
        nama_fasilitas: &str,
        tanggal: NaiveDate,
        status: &str,
    ) -> Result<Reservation, RepoError> {
        sqlx::query_as::<_, Reservation>(
            r#"UPDATE reservasi SET status = $4
               WHERE username_p = $1 AND nama_fasilitas = $2 AND tanggal_kunjungan = $3
               RETURNING username_p, nama_fasilitas, tanggal_kunjungan, jumlah_tiket, status"#,
        )
        .bind(username_p)
        .bind(nama_fasilitas)
        .bind(tanggal)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("reservation"))
    }

    // --- ADOPTERS & ADOPTIONS ---

    async fn list_adopters(&self) -> Vec<AdopterSummary> {
        sqlx::query_as::<_, AdopterSummary>(
            r#"SELECT a.id_adopter, a.username_adopter,
                      COALESCE(i.nama, o.nama_organisasi, a.username_adopter) AS nama,
                      CASE WHEN i.nik IS NOT NULL THEN 'individu' ELSE 'organisasi' END AS jenis,
                      a.total_kontribusi
               FROM adopter a
               LEFT JOIN individu i ON i.id_adopter = a.id_adopter
               LEFT JOIN organisasi o ON o.id_adopter = a.id_adopter
               ORDER BY a.total_kontribusi DESC, a.username_adopter"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_adopters error: {:?}", e);
            vec![]
        })
    }

    /// create_adopter
    ///
    /// Both inserts commit together or not at all.
    async fn create_adopter(&self, req: &CreateAdopterRequest) -> Result<AdopterSummary, RepoError> {
        let id_adopter = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO adopter (id_adopter, username_adopter, total_kontribusi) VALUES ($1, $2, 0)")
            .bind(id_adopter)
            .bind(&req.username)
            .execute(&mut *tx)
            .await?;

        let (nama, jenis) = match &req.adopter {
            AdopterKind::Individu { nik, nama } => {
                sqlx::query("INSERT INTO individu (nik, nama, id_adopter) VALUES ($1, $2, $3)")
                    .bind(nik)
                    .bind(nama)
                    .bind(id_adopter)
                    .execute(&mut *tx)
                    .await?;
                (nama.clone(), "individu")
            }
            AdopterKind::Organisasi { npp, nama_organisasi } => {
                sqlx::query("INSERT INTO organisasi (npp, nama_organisasi, id_adopter) VALUES ($1, $2, $3)")
                    .bind(npp)
                    .bind(nama_organisasi)
                    .bind(id_adopter)
                    .execute(&mut *tx)
                    .await?;
                (nama_organisasi.clone(), "organisasi")
            }
        };

        tx.commit().await?;

        Ok(AdopterSummary {
            id_adopter,
            username_adopter: req.username.clone(),
            nama,
            jenis: jenis.to_string(),
            total_kontribusi: 0,
        })
    }

    async fn list_adoptions(&self) -> Vec<Adoption> {
        sqlx::query_as::<_, Adoption>(
            r#"SELECT d.id_adopter, d.id_hewan, h.nama AS nama_hewan, d.status_pembayaran,
                      d.tgl_mulai_adopsi, d.tgl_berhenti_adopsi, d.kontribusi_finansial
               FROM adopsi d LEFT JOIN hewan h ON h.id = d.id_hewan
               ORDER BY d.tgl_mulai_adopsi DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_adoptions error: {:?}", e);
            vec![]
        })
    }

    async fn list_adoptions_for_adopter(&self, id_adopter: Uuid) -> Vec<Adoption> {
        sqlx::query_as::<_, Adoption>(
            r#"SELECT d.id_adopter, d.id_hewan, h.nama AS nama_hewan, d.status_pembayaran,
                      d.tgl_mulai_adopsi, d.tgl_berhenti_adopsi, d.kontribusi_finansial
               FROM adopsi d LEFT JOIN hewan h ON h.id = d.id_hewan
               WHERE d.id_adopter = $1
               ORDER BY d.tgl_mulai_adopsi DESC"#,
        )
        .bind(id_adopter)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_adoptions_for_adopter error: {:?}", e);
            vec![]
        })
    }

    /// create_adoption
    ///
    /// New adoptions start with payment `Tertunda`. The adopter's running total is kept
    /// by the database trigger on `adopsi`.
    async fn create_adoption(&self, req: &CreateAdoptionRequest) -> Result<Adoption, RepoError> {
        let adoption = sqlx::query_as::<_, Adoption>(
            r#"INSERT INTO adopsi (id_adopter, id_hewan, status_pembayaran, tgl_mulai_adopsi,
                                   tgl_berhenti_adopsi, kontribusi_finansial)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id_adopter, id_hewan, status_pembayaran, tgl_mulai_adopsi,
                         tgl_berhenti_adopsi, kontribusi_finansial"#,
        )
        .bind(req.id_adopter)
        .bind(req.id_hewan)
        .bind(PAYMENT_PENDING)
        .bind(req.tgl_mulai_adopsi)
        .bind(req.tgl_berhenti_adopsi)
        .bind(req.kontribusi_finansial)
        .fetch_one(&self.pool)
        .await?;
        Ok(adoption)
    }

    async fn set_adoption_payment(
        &self,
        id_adopter: Uuid,
        id_hewan: Uuid,
        status_pembayaran: &str,
    ) -> Result<Adoption, RepoError> {
        sqlx::query_as::<_, Adoption>(
            r#"UPDATE adopsi SET status_pembayaran = $3
               WHERE id_adopter = $1 AND id_hewan = $2
               RETURNING id_adopter, id_hewan, status_pembayaran, tgl_mulai_adopsi,
                         tgl_berhenti_adopsi, kontribusi_finansial"#,
        )
        .bind(id_adopter)
        .bind(id_hewan)
        .bind(status_pembayaran)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("adoption"))
    }

    async fn delete_adoption(&self, id_adopter: Uuid, id_hewan: Uuid) -> Result<(), RepoError> {
        let res = sqlx::query("DELETE FROM adopsi WHERE id_adopter = $1 AND id_hewan = $2")
            .bind(id_adopter)
            .bind(id_hewan)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("adoption"));
        }
        Ok(())
    }

    // --- SHOWS ---

    async fn list_assignments(&self, username_lh: &str) -> Vec<ShowAssignment> {
        sqlx::query_as::<_, ShowAssignment>(
            r#"SELECT username_lh, tgl_penugasan, nama_atraksi
               FROM jadwal_penugasan WHERE username_lh = $1 ORDER BY tgl_penugasan"#,
        )
        .bind(username_lh)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_assignments error: {:?}", e);
            vec![]
        })
    }
}
