use chrono::NaiveDate;
use sizopi::{
    models::{CreateReservationRequest, Registration, Role, UpdateProfileRequest},
    password::{hash_password, verify_password},
    repository::{PostgresRepository, RepoError, Repository},
    roles::resolve_role,
};
use sqlx::{Executor, PgPool, postgres::PgPoolOptions};
use tokio::test;
use uuid::Uuid;

// These tests run against a database that already carries the SIZOPI schema, its
// procedures (`register_user_with_role`, `get_user_role`, ...) and triggers. Run with
// `cargo test -- --ignored` after pointing DATABASE_URL at it.

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");
        let schema = std::env::var("DB_SCHEMA").unwrap_or_else(|_| "sizopi".to_string());
        let search_path = format!("SET search_path TO {}", schema);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

fn registration(role: Role, username: &str) -> Registration {
    let mut reg = Registration {
        role,
        username: username.to_string(),
        email: format!("{}@test.sizopi.id", username),
        password: "rahasia123".to_string(),
        nama_depan: "Uji".to_string(),
        nama_tengah: None,
        nama_belakang: "Coba".to_string(),
        no_telepon: "0800000000".to_string(),
        alamat: None,
        tgl_lahir: None,
        no_str: None,
        spesialisasi: vec![],
        id_staf: None,
    };
    match role {
        Role::Pengunjung => {
            reg.alamat = Some("Jl. Uji 1".to_string());
            reg.tgl_lahir = NaiveDate::from_ymd_opt(1999, 9, 9);
        }
        Role::DokterHewan => {
            reg.no_str = Some(unique("STR"));
            reg.spesialisasi = vec!["Reptil".to_string(), "Primata".to_string()];
        }
        _ => reg.id_staf = Some(Uuid::new_v4()),
    }
    reg
}

async fn register(repo: &PostgresRepository, role: Role, prefix: &str) -> String {
    let username = unique(prefix);
    let hash = hash_password("rahasia123").unwrap();
    repo.register_user(&registration(role, &username), &hash)
        .await
        .expect("registration through register_user_with_role");
    username
}

// --- Tests ---

#[test]
#[ignore = "requires a seeded Postgres database"]
async fn test_register_and_resolve_visitor() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = register(&repo, Role::Pengunjung, "visitor").await;

    let user = repo.find_user_by_username(&username).await.expect("user row");
    assert!(verify_password(&user, "rahasia123"));
    assert_eq!(
        repo.find_user_by_email(&user.email).await.map(|u| u.username),
        Some(username.clone())
    );

    let resolved = resolve_role(&repo, &username).await.unwrap();
    assert_eq!(resolved.role(), Role::Pengunjung);
    assert_eq!(repo.procedure_role(&username).await.as_deref(), Some("pengunjung"));
}

#[test]
#[ignore = "requires a seeded Postgres database"]
async fn test_register_veterinarian_with_specializations() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = register(&repo, Role::DokterHewan, "vet").await;

    let mut spesialisasi = repo.get_specializations(&username).await;
    spesialisasi.sort();
    assert_eq!(spesialisasi, vec!["Primata", "Reptil"]);

    repo.update_profile(
        &username,
        Role::DokterHewan,
        &UpdateProfileRequest {
            spesialisasi: Some(vec!["Unggas".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(repo.get_specializations(&username).await, vec!["Unggas"]);
    assert_eq!(repo.count_treated_animals(&username).await, Some(0));
}

#[test]
#[ignore = "requires a seeded Postgres database"]
async fn test_duplicate_username_is_rejected_by_procedure() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = register(&repo, Role::StafAdmin, "admin").await;

    let hash = hash_password("rahasia123").unwrap();
    let err = repo
        .register_user(&registration(Role::StafAdmin, &username), &hash)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Rejected(_) | RepoError::Conflict(_)));
}

#[test]
#[ignore = "requires a seeded Postgres database"]
async fn test_profile_and_password_updates() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = register(&repo, Role::Pengunjung, "profil").await;

    repo.update_profile(
        &username,
        Role::Pengunjung,
        &UpdateProfileRequest {
            nama_tengah: Some("Tengah".to_string()),
            alamat: Some("Jl. Baru 2".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let user = repo.find_user_by_username(&username).await.unwrap();
    assert_eq!(user.nama_lengkap(), "Uji Tengah Coba");
    assert_eq!(repo.find_visitor(&username).await.unwrap().alamat, "Jl. Baru 2");

    let hash = hash_password("baru12345").unwrap();
    repo.set_password_hash(&username, &hash).await.unwrap();
    let user = repo.find_user_by_username(&username).await.unwrap();
    assert!(verify_password(&user, "baru12345"));

    // Staff account edited as a visitor: the pengunjung update fails and rolls back.
    let staff = register(&repo, Role::PenjagaHewan, "staf").await;
    let failed = repo
        .update_profile(
            &staff,
            Role::Pengunjung,
            &UpdateProfileRequest {
                nama_depan: Some("Berubah".to_string()),
                alamat: Some("x".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(failed, Err(RepoError::NotFound("visitor"))));
    let staff = repo.find_user_by_username(&staff).await.unwrap();
    assert_eq!(staff.nama_depan, "Uji");
}

#[test]
#[ignore = "requires a seeded Postgres database"]
async fn test_reservation_counts_in_ticket_summary() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = register(&repo, Role::Pengunjung, "tiket").await;

    let Some(fasilitas) = sqlx::query_scalar::<_, String>("SELECT nama_fasilitas FROM reservasi LIMIT 1")
        .fetch_optional(&ctx.pool)
        .await
        .unwrap()
    else {
        return;
    };
    let tanggal = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
    let before = repo.ticket_summary(tanggal).await.unwrap();

    repo.create_reservation(
        &username,
        &CreateReservationRequest {
            nama_fasilitas: fasilitas,
            tanggal_kunjungan: tanggal,
            jumlah_tiket: 1,
        },
    )
    .await
    .unwrap();

    let after = repo.ticket_summary(tanggal).await.unwrap();
    assert_eq!(after.tiket_terjual, before.tiket_terjual + 1);
    assert_eq!(after.jumlah_pengunjung, before.jumlah_pengunjung + 1);
    assert_eq!(repo.list_reservations_for(&username).await.len(), 1);
}

#[test]
#[ignore = "requires a seeded Postgres database"]
async fn test_cancel_only_touches_scheduled_reservations() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = register(&repo, Role::Pengunjung, "batal").await;

    let Some(fasilitas) = sqlx::query_scalar::<_, String>("SELECT nama_fasilitas FROM reservasi LIMIT 1")
        .fetch_optional(&ctx.pool)
        .await
        .unwrap()
    else {
        return;
    };
    let tanggal = NaiveDate::from_ymd_opt(2099, 2, 1).unwrap();
    repo.create_reservation(
        &username,
        &CreateReservationRequest {
            nama_fasilitas: fasilitas.clone(),
            tanggal_kunjungan: tanggal,
            jumlah_tiket: 1,
        },
    )
    .await
    .unwrap();
    repo.set_reservation_status(&username, &fasilitas, tanggal, "Selesai")
        .await
        .unwrap();

    let err = repo.cancel_reservation(&username, &fasilitas, tanggal).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(repo.list_reservations_for(&username).await[0].status, "Selesai");
}
