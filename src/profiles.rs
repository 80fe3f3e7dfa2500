use chrono::NaiveDate;

use crate::{
    models::{
        AdminProfile, AdopterDetails, KeeperProfile, Profile, ProfileBase, Role, TrainerProfile,
        VeterinarianProfile, VisitorProfile,
    },
    repository::Repository,
    session::Session,
};

// Each aggregator reads the base user row, then the role marker row, then its dependent
// lookups. A missing row or a failed counter yields `None` for the whole profile.

pub async fn visitor_profile(repo: &dyn Repository, username: &str) -> Option<VisitorProfile> {
    let user = repo.find_user_by_username(username).await?;
    let visitor = repo.find_visitor(username).await?;
    let riwayat_reservasi = repo.list_reservations_for(username).await;

    Some(VisitorProfile {
        base: ProfileBase::from(&user),
        alamat: visitor.alamat,
        tgl_lahir: visitor.tgl_lahir,
        riwayat_reservasi,
        adopter: None,
    })
}

pub async fn adopter_profile(repo: &dyn Repository, username: &str) -> Option<VisitorProfile> {
    let mut profile = visitor_profile(repo, username).await?;
    let adopter = repo.find_adopter(username).await?;
    let hewan_diadopsi = repo.list_adoptions_for_adopter(adopter.id_adopter).await;

    profile.adopter = Some(AdopterDetails {
        id_adopter: adopter.id_adopter,
        total_kontribusi: adopter.total_kontribusi,
        hewan_diadopsi,
    });
    Some(profile)
}

pub async fn veterinarian_profile(repo: &dyn Repository, username: &str) -> Option<VeterinarianProfile> {
    let user = repo.find_user_by_username(username).await?;
    let vet = repo.find_veterinarian(username).await?;
    let spesialisasi = repo.get_specializations(username).await;
    let jumlah_hewan_ditangani = repo.count_treated_animals(username).await?;

    Some(VeterinarianProfile {
        base: ProfileBase::from(&user),
        no_str: vet.no_str,
        spesialisasi,
        jumlah_hewan_ditangani,
    })
}

pub async fn keeper_profile(repo: &dyn Repository, username: &str) -> Option<KeeperProfile> {
    let user = repo.find_user_by_username(username).await?;
    let keeper = repo.find_keeper(username).await?;
    let jumlah_hewan_diberi_pakan = repo.count_fed_animals(username).await?;

    Some(KeeperProfile {
        base: ProfileBase::from(&user),
        id_staf: keeper.id_staf,
        jumlah_hewan_diberi_pakan,
    })
}

pub async fn admin_profile(repo: &dyn Repository, username: &str, today: NaiveDate) -> Option<AdminProfile> {
    let user = repo.find_user_by_username(username).await?;
    let admin = repo.find_admin(username).await?;
    let summary = repo.ticket_summary(today).await?;

    Some(AdminProfile {
        base: ProfileBase::from(&user),
        id_staf: admin.id_staf,
        penjualan_tiket_hari_ini: summary.tiket_terjual,
        jumlah_pengunjung_hari_ini: summary.jumlah_pengunjung,
    })
}

pub async fn trainer_profile(repo: &dyn Repository, username: &str, today: NaiveDate) -> Option<TrainerProfile> {
    let user = repo.find_user_by_username(username).await?;
    let trainer = repo.find_trainer(username).await?;
    let assignments = repo.list_assignments(username).await;

    let total_penugasan = assignments.len() as i64;
    let jadwal_hari_ini = assignments
        .into_iter()
        .filter(|a| a.tgl_penugasan.date() == today)
        .collect();

    Some(TrainerProfile {
        base: ProfileBase::from(&user),
        id_staf: trainer.id_staf,
        jadwal_hari_ini,
        total_penugasan,
    })
}

/// load_profile
///
/// Dispatches on the session role. Admin and trainer dashboards are relative to `today`.
pub async fn load_profile(repo: &dyn Repository, session: &Session, today: NaiveDate) -> Option<Profile> {
    let username = session.username.as_str();
    let profile = match session.role {
        Role::Pengunjung => Profile::Pengunjung(visitor_profile(repo, username).await?),
        Role::Adopter => Profile::Adopter(adopter_profile(repo, username).await?),
        Role::DokterHewan => Profile::DokterHewan(veterinarian_profile(repo, username).await?),
        Role::PenjagaHewan => Profile::PenjagaHewan(keeper_profile(repo, username).await?),
        Role::StafAdmin => Profile::StafAdmin(admin_profile(repo, username, today).await?),
        Role::PelatihHewan => Profile::PelatihHewan(trainer_profile(repo, username, today).await?),
    };
    Some(profile)
}
