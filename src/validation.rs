use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Registration, Role, SignUpRequest},
};

pub const MIN_PASSWORD_LEN: usize = 6;

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Splits a comma-separated list, dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// validate_sign_up
///
/// Turns the raw sign-up form into a `Registration`. Runs before any repository call;
/// the error is the message shown back on the sign-up page.
pub fn validate_sign_up(form: &SignUpRequest) -> Result<Registration, String> {
    let required = [
        (form.role.as_str(), "Role"),
        (form.username.as_str(), "Username"),
        (form.email.as_str(), "Email"),
        (form.password.as_str(), "Password"),
        (form.confirm_password.as_str(), "Password confirmation"),
        (form.nama_depan.as_str(), "First name"),
        (form.nama_belakang.as_str(), "Last name"),
        (form.no_telepon.as_str(), "Phone number"),
    ];
    if let Some((_, label)) = required.iter().find(|(value, _)| blank(value)) {
        return Err(format!("{} is required", label));
    }

    let role = Role::parse(&form.role).ok_or_else(|| "Invalid role".to_string())?;

    let username = form.username.trim();
    if username.contains('@') {
        return Err("Username cannot contain @".to_string());
    }
    let email = form.email.trim();
    if !email.contains('@') {
        return Err("Invalid email address".to_string());
    }
    if form.password != form.confirm_password {
        return Err("Passwords do not match".to_string());
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }

    let mut reg = Registration {
        role,
        username: username.to_string(),
        email: email.to_string(),
        password: form.password.clone(),
        nama_depan: form.nama_depan.trim().to_string(),
        nama_tengah: non_blank(form.nama_tengah.as_deref()),
        nama_belakang: form.nama_belakang.trim().to_string(),
        no_telepon: form.no_telepon.trim().to_string(),
        alamat: None,
        tgl_lahir: None,
        no_str: None,
        spesialisasi: Vec::new(),
        id_staf: None,
    };

    match role {
        Role::Pengunjung => {
            let alamat = non_blank(form.alamat.as_deref())
                .ok_or_else(|| "Address is required for visitors".to_string())?;
            let raw_date = non_blank(form.tgl_lahir.as_deref())
                .ok_or_else(|| "Date of birth is required for visitors".to_string())?;
            let tgl_lahir = parse_date(&raw_date)
                .ok_or_else(|| "Date of birth must be in YYYY-MM-DD format".to_string())?;
            reg.alamat = Some(alamat);
            reg.tgl_lahir = Some(tgl_lahir);
        }
        Role::DokterHewan => {
            reg.no_str = Some(
                non_blank(form.no_str.as_deref())
                    .ok_or_else(|| "STR number is required for veterinarians".to_string())?,
            );
            reg.spesialisasi = form
                .spesialisasi
                .as_deref()
                .map(split_list)
                .unwrap_or_default();
        }
        Role::PenjagaHewan | Role::StafAdmin | Role::PelatihHewan => {
            reg.id_staf = Some(Uuid::new_v4());
        }
        Role::Adopter => return Err("Invalid role".to_string()),
    }

    Ok(reg)
}

// --- JSON payload checks ---

pub fn require_text(value: &str, field: &str) -> Result<(), ApiError> {
    if blank(value) {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// `None` passes; `Some` must not be blank.
pub fn optional_text(value: Option<&str>, field: &str) -> Result<(), ApiError> {
    match value {
        Some(v) => require_text(v, field),
        None => Ok(()),
    }
}

pub fn require_positive(value: i32, field: &str) -> Result<(), ApiError> {
    if value <= 0 {
        return Err(ApiError::Validation(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

pub fn require_status(value: &str, allowed: &[&str], field: &str) -> Result<(), ApiError> {
    if !allowed.contains(&value) {
        return Err(ApiError::Validation(format!(
            "{} must be one of: {}",
            field,
            allowed.join(", ")
        )));
    }
    Ok(())
}

/// Password change: new password twice, minimum length, and a non-empty current one.
pub fn validate_new_password(old: &str, new: &str, confirm: &str) -> Result<(), ApiError> {
    if old.is_empty() {
        return Err(ApiError::Validation("Current password is required".to_string()));
    }
    if new != confirm {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
