use chrono::NaiveDate;
use sizopi::{
    models::{AdopterKind, Profile, ProfileBase, Role, SignUpRequest, User, VisitorProfile},
    validation::{require_positive, require_status, split_list, validate_new_password, validate_sign_up},
};

// --- Test Utilities ---

fn form(role: &str) -> SignUpRequest {
    SignUpRequest {
        role: role.to_string(),
        username: "ani".to_string(),
        email: "ani@example.com".to_string(),
        password: "rahasia123".to_string(),
        confirm_password: "rahasia123".to_string(),
        nama_depan: "Ani".to_string(),
        nama_belakang: "Wijaya".to_string(),
        no_telepon: "0811111111".to_string(),
        ..Default::default()
    }
}

fn visitor_form() -> SignUpRequest {
    SignUpRequest {
        alamat: Some("Jl. Melati 3".to_string()),
        tgl_lahir: Some("2001-02-03".to_string()),
        ..form("pengunjung")
    }
}

// --- Sign-up Validation ---

#[test]
fn test_valid_visitor_sign_up() {
    let reg = validate_sign_up(&SignUpRequest {
        nama_tengah: Some("  ".to_string()),
        ..visitor_form()
    })
    .unwrap();

    assert_eq!(reg.role, Role::Pengunjung);
    assert_eq!(reg.alamat.as_deref(), Some("Jl. Melati 3"));
    assert_eq!(reg.tgl_lahir, NaiveDate::from_ymd_opt(2001, 2, 3));
    assert_eq!(reg.nama_tengah, None);
    assert!(reg.id_staf.is_none());
}

#[test]
fn test_required_fields_reported_in_order() {
    let err = validate_sign_up(&SignUpRequest::default()).unwrap_err();
    assert_eq!(err, "Role is required");

    let err = validate_sign_up(&SignUpRequest {
        no_telepon: "".to_string(),
        ..visitor_form()
    })
    .unwrap_err();
    assert_eq!(err, "Phone number is required");
}

#[test]
fn test_sign_up_rejections() {
    let cases = [
        (form("kurator"), "Invalid role"),
        (form("adopter"), "Invalid role"),
        (
            SignUpRequest {
                username: "ani@zoo".to_string(),
                ..visitor_form()
            },
            "Username cannot contain @",
        ),
        (
            SignUpRequest {
                email: "ani.example.com".to_string(),
                ..visitor_form()
            },
            "Invalid email address",
        ),
        (
            SignUpRequest {
                confirm_password: "rahasia124".to_string(),
                ..visitor_form()
            },
            "Passwords do not match",
        ),
        (
            SignUpRequest {
                password: "abc".to_string(),
                confirm_password: "abc".to_string(),
                ..visitor_form()
            },
            "Password must be at least 6 characters",
        ),
        (form("pengunjung"), "Address is required for visitors"),
        (
            SignUpRequest {
                tgl_lahir: Some("03/02/2001".to_string()),
                ..visitor_form()
            },
            "Date of birth must be in YYYY-MM-DD format",
        ),
        (form("dokter_hewan"), "STR number is required for veterinarians"),
    ];

    for (input, expected) in cases {
        assert_eq!(validate_sign_up(&input).unwrap_err(), expected);
    }
}

#[test]
fn test_veterinarian_and_staff_sign_up() {
    let vet = validate_sign_up(&SignUpRequest {
        no_str: Some("STR-2024-0001".to_string()),
        spesialisasi: Some("Reptil, , Primata".to_string()),
        ..form("dokter_hewan")
    })
    .unwrap();
    assert_eq!(vet.spesialisasi, vec!["Reptil", "Primata"]);

    for role in ["penjaga_hewan", "staf_admin", "pelatih_hewan"] {
        let staff = validate_sign_up(&form(role)).unwrap();
        assert!(staff.id_staf.is_some(), "{} gets a staff id", role);
    }
}

#[test]
fn test_payload_checks() {
    assert!(require_positive(1, "jumlah").is_ok());
    assert_eq!(
        require_positive(0, "jumlah").unwrap_err().to_string(),
        "jumlah must be greater than 0"
    );
    assert_eq!(
        require_status("Hilang", &["Tertunda", "Lunas"], "status_pembayaran")
            .unwrap_err()
            .to_string(),
        "status_pembayaran must be one of: Tertunda, Lunas"
    );
    assert_eq!(
        validate_new_password("", "baru123", "baru123").unwrap_err().to_string(),
        "Current password is required"
    );
    assert!(validate_new_password("lama", "baru123", "baru123").is_ok());
    assert!(split_list(" , ").is_empty());
}

// --- Serialized Shapes ---

#[test]
fn test_nama_lengkap_skips_missing_middle_name() {
    let user = User {
        nama_depan: "Budi".to_string(),
        nama_tengah: Some(" ".to_string()),
        nama_belakang: "Santoso".to_string(),
        ..Default::default()
    };
    assert_eq!(user.nama_lengkap(), "Budi Santoso");

    let user = User {
        nama_tengah: Some("Adi".to_string()),
        ..user
    };
    assert_eq!(user.nama_lengkap(), "Budi Adi Santoso");
}

#[test]
fn test_user_never_serializes_passwords() {
    let user = User {
        username: "budi".to_string(),
        password: "rahasia".to_string(),
        hashed_password: Some("$argon2id$...".to_string()),
        ..Default::default()
    };
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("hashed_password").is_none());
}

#[test]
fn test_role_tags() {
    for role in [
        Role::Pengunjung,
        Role::Adopter,
        Role::DokterHewan,
        Role::PenjagaHewan,
        Role::StafAdmin,
        Role::PelatihHewan,
    ] {
        assert_eq!(Role::parse(role.as_str()), Some(role));
        assert_eq!(serde_json::to_value(role).unwrap(), role.as_str());
    }
}

#[test]
fn test_visitor_profile_flattens_base() {
    let profile = Profile::Pengunjung(VisitorProfile {
        base: ProfileBase {
            username: "ani".to_string(),
            email: "ani@example.com".to_string(),
            nama_lengkap: "Ani Wijaya".to_string(),
            no_telepon: "0811".to_string(),
        },
        alamat: "Bogor".to_string(),
        tgl_lahir: NaiveDate::from_ymd_opt(2001, 2, 3).unwrap(),
        ..Default::default()
    });

    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["role"], "pengunjung");
    assert_eq!(json["username"], "ani");
    assert_eq!(json["nama_lengkap"], "Ani Wijaya");
    assert_eq!(json["tgl_lahir"], "2001-02-03");
    assert!(json["adopter"].is_null());
}

#[test]
fn test_adopter_kind_tag() {
    let kind: AdopterKind = serde_json::from_value(serde_json::json!({
        "jenis": "organisasi",
        "npp": "NPP-01",
        "nama_organisasi": "Yayasan Satwa"
    }))
    .unwrap();
    assert_eq!(
        kind,
        AdopterKind::Organisasi {
            npp: "NPP-01".to_string(),
            nama_organisasi: "Yayasan Satwa".to_string(),
        }
    );
}
