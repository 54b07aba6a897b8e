// src/services/clinic_service.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClinicRepository,
    models::clinic::{Branch, Clinic, ClinicPayload},
};

#[derive(Clone)]
pub struct ClinicService {
    repo: ClinicRepository,
}

impl ClinicService {
    pub fn new(repo: ClinicRepository) -> Self {
        Self { repo }
    }

    /// Cria a clínica e todas as suas sedes, atomicamente.
    pub async fn create_clinic(&self, payload: &ClinicPayload) -> Result<Clinic, AppError> {
        let mut tx = self.repo.pool().begin().await?;

        let mut clinic = self.repo.insert_clinic(&mut *tx, payload).await?;
        clinic.branches = self
            .repo
            .insert_branches(&mut *tx, clinic.id, &payload.branches)
            .await?;

        tx.commit().await?;

        tracing::info!(clinic_id = %clinic.id, branches = clinic.branches.len(), "clínica criada");
        Ok(clinic)
    }

    /// Atualiza a clínica e troca o conjunto de sedes inteiro na mesma transação.
    pub async fn update_clinic(&self, id: Uuid, payload: &ClinicPayload) -> Result<Clinic, AppError> {
        let mut tx = self.repo.pool().begin().await?;

        // Sem linha atualizada: o drop do `tx` faz o rollback
        let mut clinic = self
            .repo
            .update_clinic(&mut *tx, id, payload)
            .await?
            .ok_or(AppError::NotFound("clinic"))?;

        let removed = self.repo.delete_branches(&mut *tx, id).await?;
        clinic.branches = self
            .repo
            .insert_branches(&mut *tx, id, &payload.branches)
            .await?;

        tx.commit().await?;

        tracing::info!(
            clinic_id = %id,
            removed,
            inserted = clinic.branches.len(),
            "clínica atualizada"
        );
        Ok(clinic)
    }

    pub async fn delete_clinic(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.repo.pool().begin().await?;

        if self.repo.delete_clinic(&mut *tx, id).await? == 0 {
            return Err(AppError::NotFound("clinic"));
        }

        tx.commit().await?;
        tracing::info!(clinic_id = %id, "clínica removida");
        Ok(())
    }

    pub async fn get_clinic(&self, id: Uuid) -> Result<Clinic, AppError> {
        let mut clinic = self
            .repo
            .find_clinic(self.repo.pool(), id)
            .await?
            .ok_or(AppError::NotFound("clinic"))?;

        clinic.branches = self.repo.branches_for(self.repo.pool(), &[id]).await?;
        Ok(clinic)
    }

    pub async fn list_clinics(&self) -> Result<Vec<Clinic>, AppError> {
        let mut clinics = self.repo.list_clinics(self.repo.pool()).await?;
        let ids: Vec<Uuid> = clinics.iter().map(|c| c.id).collect();

        let mut by_clinic: HashMap<Uuid, Vec<Branch>> = HashMap::new();
        for branch in self.repo.branches_for(self.repo.pool(), &ids).await? {
            by_clinic.entry(branch.clinic_id).or_default().push(branch);
        }

        for clinic in &mut clinics {
            clinic.branches = by_clinic.remove(&clinic.id).unwrap_or_default();
        }

        Ok(clinics)
    }
}
