// src/services/patient_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClinicRepository, PatientRepository},
    middleware::access::{Grant, TenantScope},
    models::patient::{Patient, PatientPayload},
};

#[derive(Clone)]
pub struct PatientService {
    repo: PatientRepository,
    clinic_repo: ClinicRepository,
    pool: PgPool,
}

impl PatientService {
    pub fn new(repo: PatientRepository, clinic_repo: ClinicRepository, pool: PgPool) -> Self {
        Self {
            repo,
            clinic_repo,
            pool,
        }
    }

    /// A clínica do paciente é validada na mesma transação do INSERT.
    pub async fn create_patient(
        &self,
        grant: &Grant,
        payload: &PatientPayload,
    ) -> Result<Patient, AppError> {
        let clinic_id = grant.clinic_id.ok_or(AppError::MissingField("clinic_id"))?;

        let mut tx = self.pool.begin().await?;

        if !self.clinic_repo.clinic_exists(&mut *tx, clinic_id).await? {
            return Err(AppError::ClinicNotFound);
        }

        let patient = self.repo.insert_patient(&mut *tx, clinic_id, payload).await?;

        tx.commit().await?;

        tracing::info!(patient_id = %patient.id, clinic_id = %clinic_id, "paciente criado");
        Ok(patient)
    }

    /// O UPDATE também filtra pelo escopo concedido pelo gate.
    pub async fn update_patient(
        &self,
        id: Uuid,
        grant: &Grant,
        payload: &PatientPayload,
    ) -> Result<Patient, AppError> {
        let clinic_id = grant.clinic_id.ok_or(AppError::MissingField("clinic_id"))?;

        let mut tx = self.pool.begin().await?;

        if !self.clinic_repo.clinic_exists(&mut *tx, clinic_id).await? {
            return Err(AppError::ClinicNotFound);
        }

        let patient = self
            .repo
            .update_patient(&mut *tx, id, grant.scope.clinic_id(), clinic_id, payload)
            .await?
            .ok_or(AppError::NotFound("patient"))?;

        tx.commit().await?;

        tracing::info!(patient_id = %id, "paciente atualizado");
        Ok(patient)
    }

    /// Apaga só dentro de `scope`; fora dele o paciente é tratado como inexistente.
    pub async fn delete_patient(&self, id: Uuid, scope: TenantScope) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.repo.delete_patient(&mut *tx, id, scope.clinic_id()).await? == 0 {
            return Err(AppError::NotFound("patient"));
        }

        tx.commit().await?;
        tracing::info!(patient_id = %id, "paciente removido");
        Ok(())
    }

    pub async fn get_patient(&self, id: Uuid, scope: TenantScope) -> Result<Patient, AppError> {
        self.repo
            .find_patient(&self.pool, id, scope.clinic_id())
            .await?
            .ok_or(AppError::NotFound("patient"))
    }

    pub async fn list_patients(&self, scope: TenantScope) -> Result<Vec<Patient>, AppError> {
        self.repo.list_patients(&self.pool, scope.clinic_id()).await
    }
}
