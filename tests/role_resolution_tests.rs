use chrono::NaiveDate;
use sizopi::{
    error::ApiError,
    models::{ResolvedRole, Role},
    repository::MockRepository,
    roles::{RoleProbe, resolve_role},
};
use tokio::test;
use uuid::Uuid;

fn born() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 8, 17).unwrap()
}

#[test]
async fn test_budi_visitor_and_adopter_resolves_to_adopter() {
    let repo = MockRepository::new()
        .with_visitor("budi", "Jl. Kenanga 5, Depok", born())
        .with_adopter("budi", Uuid::new_v4(), 500_000);

    let resolved = resolve_role(&repo, "budi").await.unwrap();

    assert_eq!(
        resolved,
        ResolvedRole::Adopter {
            alamat: "Jl. Kenanga 5, Depok".to_string(),
            tgl_lahir: born(),
        }
    );
    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["role"], "adopter");
    assert_eq!(json["alamat"], "Jl. Kenanga 5, Depok");
}

#[test]
async fn test_plain_visitor_resolves_to_pengunjung() {
    let repo = MockRepository::new().with_visitor("ani", "Bogor", born());

    let resolved = resolve_role(&repo, "ani").await.unwrap();
    assert_eq!(resolved.role(), Role::Pengunjung);
}

#[test]
async fn test_drsiti_veterinarian_with_specializations() {
    let repo = MockRepository::new().with_veterinarian("drsiti", "STR-2024-0001", &["Reptil", "Primata"]);

    let resolved = resolve_role(&repo, "drsiti").await.unwrap();

    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["role"], "dokter_hewan");
    assert_eq!(json["no_str"], "STR-2024-0001");
    assert_eq!(json["spesialisasi"], serde_json::json!(["Reptil", "Primata"]));
}

#[test]
async fn test_each_staff_marker_maps_to_its_role() {
    let (keeper, admin, trainer) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let repo = MockRepository::new()
        .with_keeper("joko", keeper)
        .with_admin("sari", admin)
        .with_trainer("rudi", trainer);

    assert_eq!(
        resolve_role(&repo, "joko").await.unwrap(),
        ResolvedRole::PenjagaHewan { id_staf: keeper }
    );
    assert_eq!(
        resolve_role(&repo, "sari").await.unwrap(),
        ResolvedRole::StafAdmin { id_staf: admin }
    );
    assert_eq!(
        resolve_role(&repo, "rudi").await.unwrap(),
        ResolvedRole::PelatihHewan { id_staf: trainer }
    );
}

#[test]
async fn test_no_marker_rows_is_no_role_found() {
    let repo = MockRepository::new();

    let err = resolve_role(&repo, "ghost").await.unwrap_err();
    assert!(matches!(err, ApiError::NoRoleFound));
    assert_eq!(err.to_string(), "No role found for this account");
}

#[test]
async fn test_priority_order_visitor_beats_staff_markers() {
    // Inconsistent data: the same username in several marker tables.
    let repo = MockRepository::new()
        .with_trainer("campur", Uuid::new_v4())
        .with_veterinarian("campur", "STR-9", &[])
        .with_visitor("campur", "Jakarta", born());

    let resolved = resolve_role(&repo, "campur").await.unwrap();
    assert_eq!(resolved.role(), Role::Pengunjung);
}

#[test]
async fn test_priority_order_keeper_before_admin() {
    let repo = MockRepository::new()
        .with_admin("dobel", Uuid::new_v4())
        .with_keeper("dobel", Uuid::new_v4());

    let resolved = resolve_role(&repo, "dobel").await.unwrap();
    assert_eq!(resolved.role(), Role::PenjagaHewan);
}

#[test]
async fn test_probe_list_order() {
    assert_eq!(
        RoleProbe::PRIORITY,
        [
            RoleProbe::Visitor,
            RoleProbe::Veterinarian,
            RoleProbe::AnimalKeeper,
            RoleProbe::Admin,
            RoleProbe::Trainer,
        ]
    );

    let repo = MockRepository::new().with_admin("sari", Uuid::new_v4());
    assert!(RoleProbe::Visitor.probe(&repo, "sari").await.is_none());
    assert!(RoleProbe::Admin.probe(&repo, "sari").await.is_some());
}

#[test]
async fn test_dashboard_routes() {
    assert_eq!(Role::Adopter.dashboard_route(), "/protected/dashboard/pengunjung");
    assert_eq!(Role::Pengunjung.dashboard_route(), "/protected/dashboard/pengunjung");
    assert_eq!(Role::DokterHewan.dashboard_route(), "/protected/dashboard/dokter-hewan");
    assert_eq!(Role::PenjagaHewan.dashboard_route(), "/protected/dashboard/penjaga-hewan");
    assert_eq!(Role::StafAdmin.dashboard_route(), "/protected/dashboard/staf-administrasi");
    assert_eq!(Role::PelatihHewan.dashboard_route(), "/protected/dashboard/staf-pelatih");
}
