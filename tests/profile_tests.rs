use chrono::{NaiveDate, NaiveDateTime};
use sizopi::{
    models::{
        Adoption, Animal, MedicalRecord, Profile, ResolvedRole, Reservation, ShowAssignment, User,
    },
    profiles::{
        admin_profile, adopter_profile, keeper_profile, load_profile, trainer_profile,
        veterinarian_profile, visitor_profile,
    },
    repository::MockRepository,
    session::Session,
};
use tokio::test;
use uuid::Uuid;

// --- Fixtures ---

fn user(username: &str) -> User {
    User {
        username: username.to_string(),
        email: format!("{}@sizopi.id", username),
        password: "rahasia".to_string(),
        hashed_password: None,
        nama_depan: "Budi".to_string(),
        nama_tengah: None,
        nama_belakang: "Santoso".to_string(),
        no_telepon: "081234567890".to_string(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    date(2025, 6, 1)
}

fn reservation(username: &str, fasilitas: &str, tanggal: NaiveDate, tiket: i32, status: &str) -> Reservation {
    Reservation {
        username_p: username.to_string(),
        nama_fasilitas: fasilitas.to_string(),
        tanggal_kunjungan: tanggal,
        jumlah_tiket: tiket,
        status: status.to_string(),
    }
}

fn animal(nama: &str) -> Animal {
    Animal {
        id: Uuid::new_v4(),
        nama: Some(nama.to_string()),
        spesies: "Panthera tigris".to_string(),
        asal_hewan: "Sumatra".to_string(),
        status_kesehatan: "Sehat".to_string(),
        ..Default::default()
    }
}

// --- Visitor & Adopter ---

#[test]
async fn test_visitor_profile_lists_reservation_history() {
    let repo = MockRepository::new()
        .with_user(user("ani"))
        .with_visitor("ani", "Bogor", date(2000, 1, 1))
        .with_reservation(reservation("ani", "Taman Reptil", date(2025, 5, 1), 2, "Selesai"))
        .with_reservation(reservation("ani", "Arena Satwa", date(2025, 6, 3), 4, "Terjadwal"))
        .with_reservation(reservation("budi", "Arena Satwa", date(2025, 6, 3), 1, "Terjadwal"));

    let profile = visitor_profile(&repo, "ani").await.expect("visitor profile");

    assert_eq!(profile.base.nama_lengkap, "Budi Santoso");
    assert_eq!(profile.alamat, "Bogor");
    assert_eq!(profile.riwayat_reservasi.len(), 2);
    // Most recent visit first.
    assert_eq!(profile.riwayat_reservasi[0].nama_fasilitas, "Arena Satwa");
    assert!(profile.adopter.is_none());
}

#[test]
async fn test_adopter_profile_includes_adopted_animals() {
    let id_adopter = Uuid::new_v4();
    let harimau = animal("Raja");
    let repo = MockRepository::new()
        .with_user(user("budi"))
        .with_visitor("budi", "Depok", date(1995, 8, 17))
        .with_adopter("budi", id_adopter, 750_000)
        .with_animal(harimau.clone())
        .with_adoption(Adoption {
            id_adopter,
            id_hewan: harimau.id,
            nama_hewan: None,
            status_pembayaran: "Lunas".to_string(),
            tgl_mulai_adopsi: date(2025, 1, 1),
            tgl_berhenti_adopsi: date(2025, 12, 31),
            kontribusi_finansial: 750_000,
        });

    let profile = adopter_profile(&repo, "budi").await.expect("adopter profile");
    let adopter = profile.adopter.expect("adopter details");

    assert_eq!(adopter.id_adopter, id_adopter);
    assert_eq!(adopter.total_kontribusi, 750_000);
    assert_eq!(adopter.hewan_diadopsi.len(), 1);
    assert_eq!(adopter.hewan_diadopsi[0].nama_hewan.as_deref(), Some("Raja"));
}

#[test]
async fn test_adopter_profile_without_adopter_row_is_none() {
    let repo = MockRepository::new()
        .with_user(user("ani"))
        .with_visitor("ani", "Bogor", date(2000, 1, 1));

    assert!(adopter_profile(&repo, "ani").await.is_none());
}

#[test]
async fn test_missing_user_row_is_none() {
    let repo = MockRepository::new().with_visitor("hantu", "Bogor", date(2000, 1, 1));
    assert!(visitor_profile(&repo, "hantu").await.is_none());
}

// --- Staff ---

#[test]
async fn test_veterinarian_profile_counts_distinct_animals() {
    let (a, b) = (animal("Raja"), animal("Mimi"));
    let record = |id_hewan: Uuid, tanggal: NaiveDate| MedicalRecord {
        id_hewan,
        username_dh: "drsiti".to_string(),
        tanggal_pemeriksaan: tanggal,
        status_kesehatan: "Sehat".to_string(),
        ..Default::default()
    };
    let repo = MockRepository::new()
        .with_user(user("drsiti"))
        .with_veterinarian("drsiti", "STR-1", &["Reptil", "Primata"])
        .with_medical_record(record(a.id, date(2025, 5, 1)))
        .with_medical_record(record(a.id, date(2025, 5, 20)))
        .with_medical_record(record(b.id, date(2025, 5, 2)));

    let profile = veterinarian_profile(&repo, "drsiti").await.expect("vet profile");

    assert_eq!(profile.no_str, "STR-1");
    assert_eq!(profile.spesialisasi, vec!["Reptil", "Primata"]);
    assert_eq!(profile.jumlah_hewan_ditangani, 2);
}

#[test]
async fn test_keeper_profile_counts_fed_animals() {
    let id_staf = Uuid::new_v4();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let repo = MockRepository::new()
        .with_user(user("joko"))
        .with_keeper("joko", id_staf)
        .with_fed_by(a, at(2025, 5, 1, 8), "joko")
        .with_fed_by(a, at(2025, 5, 2, 8), "joko")
        .with_fed_by(b, at(2025, 5, 1, 9), "joko")
        .with_fed_by(b, at(2025, 5, 1, 10), "andi");

    let profile = keeper_profile(&repo, "joko").await.expect("keeper profile");

    assert_eq!(profile.id_staf, id_staf);
    assert_eq!(profile.jumlah_hewan_diberi_pakan, 2);
}

#[test]
async fn test_admin_profile_summarises_todays_tickets() {
    let repo = MockRepository::new()
        .with_user(user("sari"))
        .with_admin("sari", Uuid::new_v4())
        .with_reservation(reservation("ani", "Arena Satwa", today(), 3, "Terjadwal"))
        .with_reservation(reservation("ani", "Taman Reptil", today(), 1, "Selesai"))
        .with_reservation(reservation("budi", "Arena Satwa", today(), 2, "Terjadwal"))
        .with_reservation(reservation("cici", "Arena Satwa", today(), 5, "Dibatalkan"))
        .with_reservation(reservation("dodi", "Arena Satwa", date(2025, 6, 2), 9, "Terjadwal"));

    let profile = admin_profile(&repo, "sari", today()).await.expect("admin profile");

    assert_eq!(profile.penjualan_tiket_hari_ini, 6);
    assert_eq!(profile.jumlah_pengunjung_hari_ini, 2);
}

#[test]
async fn test_trainer_profile_filters_today() {
    let assignment = |when: NaiveDateTime, atraksi: &str| ShowAssignment {
        username_lh: "rudi".to_string(),
        tgl_penugasan: when,
        nama_atraksi: atraksi.to_string(),
    };
    let repo = MockRepository::new()
        .with_user(user("rudi"))
        .with_trainer("rudi", Uuid::new_v4())
        .with_assignment(assignment(at(2025, 6, 1, 14), "Atraksi Burung"))
        .with_assignment(assignment(at(2025, 6, 1, 10), "Atraksi Lumba-lumba"))
        .with_assignment(assignment(at(2025, 5, 30, 10), "Atraksi Gajah"));

    let profile = trainer_profile(&repo, "rudi", today()).await.expect("trainer profile");

    assert_eq!(profile.total_penugasan, 3);
    let names: Vec<&str> = profile
        .jadwal_hari_ini
        .iter()
        .map(|a| a.nama_atraksi.as_str())
        .collect();
    assert_eq!(names, vec!["Atraksi Lumba-lumba", "Atraksi Burung"]);
}

#[test]
async fn test_failing_counter_yields_no_profile() {
    let repo = MockRepository::new()
        .with_user(user("drsiti"))
        .with_veterinarian("drsiti", "STR-1", &[])
        .with_user(user("sari"))
        .with_admin("sari", Uuid::new_v4())
        .with_failing_counters();

    assert!(veterinarian_profile(&repo, "drsiti").await.is_none());
    assert!(admin_profile(&repo, "sari", today()).await.is_none());
}

// --- Dispatch ---

#[test]
async fn test_load_profile_dispatches_on_session_role() {
    let repo = MockRepository::new()
        .with_user(user("joko"))
        .with_keeper("joko", Uuid::new_v4());
    let session = Session::new(
        "joko",
        ResolvedRole::PenjagaHewan { id_staf: Uuid::new_v4() },
        0,
    );

    let profile = load_profile(&repo, &session, today()).await.expect("profile");
    assert!(matches!(profile, Profile::PenjagaHewan(_)));

    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["role"], "penjaga_hewan");
    assert_eq!(json["username"], "joko");
    assert_eq!(json["jumlah_hewan_diberi_pakan"], 0);
}

#[test]
async fn test_load_profile_for_adopter_session() {
    let repo = MockRepository::new()
        .with_user(user("budi"))
        .with_visitor("budi", "Depok", date(1995, 8, 17))
        .with_adopter("budi", Uuid::new_v4(), 0);
    let session = Session::new(
        "budi",
        ResolvedRole::Adopter {
            alamat: "Depok".to_string(),
            tgl_lahir: date(1995, 8, 17),
        },
        0,
    );

    let profile = load_profile(&repo, &session, today()).await.expect("profile");
    match profile {
        Profile::Adopter(p) => assert!(p.adopter.is_some()),
        other => panic!("unexpected profile {:?}", other),
    }
}
