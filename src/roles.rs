use crate::{error::ApiError, models::ResolvedRole, repository::Repository};

/// RoleProbe
///
/// One marker-table check of the role resolver. A username is expected in at most one
/// marker table; if it appears in several, the first probe in `PRIORITY` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleProbe {
    Visitor,
    Veterinarian,
    AnimalKeeper,
    Admin,
    Trainer,
}

impl RoleProbe {
    pub const PRIORITY: [RoleProbe; 5] = [
        RoleProbe::Visitor,
        RoleProbe::Veterinarian,
        RoleProbe::AnimalKeeper,
        RoleProbe::Admin,
        RoleProbe::Trainer,
    ];

    /// Runs this probe for `username`, returning the role payload when the marker row
    /// exists. The visitor probe refines to `Adopter` when an adopter row also exists.
    pub async fn probe(self, repo: &dyn Repository, username: &str) -> Option<ResolvedRole> {
        match self {
            RoleProbe::Visitor => {
                let visitor = repo.find_visitor(username).await?;
                if repo.find_adopter(username).await.is_some() {
                    Some(ResolvedRole::Adopter {
                        alamat: visitor.alamat,
                        tgl_lahir: visitor.tgl_lahir,
                    })
                } else {
                    Some(ResolvedRole::Pengunjung {
                        alamat: visitor.alamat,
                        tgl_lahir: visitor.tgl_lahir,
                    })
                }
            }
            RoleProbe::Veterinarian => {
                let vet = repo.find_veterinarian(username).await?;
                let spesialisasi = repo.get_specializations(username).await;
                Some(ResolvedRole::DokterHewan {
                    no_str: vet.no_str,
                    spesialisasi,
                })
            }
            RoleProbe::AnimalKeeper => repo
                .find_keeper(username)
                .await
                .map(|s| ResolvedRole::PenjagaHewan { id_staf: s.id_staf }),
            RoleProbe::Admin => repo
                .find_admin(username)
                .await
                .map(|s| ResolvedRole::StafAdmin { id_staf: s.id_staf }),
            RoleProbe::Trainer => repo
                .find_trainer(username)
                .await
                .map(|s| ResolvedRole::PelatihHewan { id_staf: s.id_staf }),
        }
    }
}

/// resolve_role
///
/// Walks `RoleProbe::PRIORITY` and returns the first hit. Nothing is cached; every
/// call hits the repository again.
pub async fn resolve_role(repo: &dyn Repository, username: &str) -> Result<ResolvedRole, ApiError> {
    for probe in RoleProbe::PRIORITY {
        if let Some(resolved) = probe.probe(repo, username).await {
            tracing::debug!(username, ?probe, role = resolved.role().as_str(), "role resolved");
            return Ok(resolved);
        }
    }
    tracing::info!(username, "no role marker found");
    Err(ApiError::NoRoleFound)
}
