// src/db/clinic_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::{map_clinic_delete_error, map_constraint_error, AppError},
    models::clinic::{Branch, BranchPayload, Clinic, ClinicPayload},
};

const CLINIC_COLUMNS: &str = r#"
    id, name, tax_id, address, service_code, phone, email,
    logo, small_logo, status, created_at, updated_at
"#;

#[derive(Clone)]
pub struct ClinicRepository {
    pool: PgPool,
}

impl ClinicRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  CLÍNICAS
    // =========================================================================

    pub async fn insert_clinic<'e, E>(
        &self,
        executor: E,
        payload: &ClinicPayload,
    ) -> Result<Clinic, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clinics (
                name, tax_id, address, service_code, phone, email,
                logo, small_logo, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CLINIC_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Clinic>(&sql)
            .bind(&payload.name)
            .bind(&payload.tax_id)
            .bind(&payload.address)
            .bind(&payload.service_code)
            .bind(&payload.phone)
            .bind(&payload.email)
            .bind(&payload.logo)
            .bind(&payload.small_logo)
            .bind(payload.status)
            .fetch_one(executor)
            .await
            .map_err(map_constraint_error)
    }

    /// Substitui todos os campos. `None` quando o id não existe.
    pub async fn update_clinic<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ClinicPayload,
    ) -> Result<Option<Clinic>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clinics
            SET name = $2, tax_id = $3, address = $4, service_code = $5,
                phone = $6, email = $7, logo = $8, small_logo = $9,
                status = $10, updated_at = now()
            WHERE id = $1
            RETURNING {CLINIC_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Clinic>(&sql)
            .bind(id)
            .bind(&payload.name)
            .bind(&payload.tax_id)
            .bind(&payload.address)
            .bind(&payload.service_code)
            .bind(&payload.phone)
            .bind(&payload.email)
            .bind(&payload.logo)
            .bind(&payload.small_logo)
            .bind(payload.status)
            .fetch_optional(executor)
            .await
            .map_err(map_constraint_error)
    }

    /// Retorna o número de linhas apagadas (0 ou 1).
    pub async fn delete_clinic<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clinics WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_clinic_delete_error)?;

        Ok(result.rows_affected())
    }

    pub async fn find_clinic<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Clinic>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLINIC_COLUMNS} FROM clinics WHERE id = $1");
        let clinic = sqlx::query_as::<_, Clinic>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(clinic)
    }

    pub async fn list_clinics<'e, E>(&self, executor: E) -> Result<Vec<Clinic>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLINIC_COLUMNS} FROM clinics ORDER BY name ASC");
        let clinics = sqlx::query_as::<_, Clinic>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(clinics)
    }

    pub async fn clinic_exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM clinics WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }

    // =========================================================================
    //  SEDES
    // =========================================================================

    /// Insere todas as sedes num único INSERT multi-linha.
    pub async fn insert_branches<'e, E>(
        &self,
        executor: E,
        clinic_id: Uuid,
        branches: &[BranchPayload],
    ) -> Result<Vec<Branch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if branches.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO clinic_branches (clinic_id, name, address, phone, service_code) ");
        builder.push_values(branches, |mut row, branch| {
            row.push_bind(clinic_id)
                .push_bind(&branch.name)
                .push_bind(&branch.address)
                .push_bind(&branch.phone)
                .push_bind(&branch.service_code);
        });
        builder.push(" RETURNING id, clinic_id, name, address, phone, service_code");

        builder
            .build_query_as::<Branch>()
            .fetch_all(executor)
            .await
            .map_err(map_constraint_error)
    }

    pub async fn delete_branches<'e, E>(&self, executor: E, clinic_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clinic_branches WHERE clinic_id = $1")
            .bind(clinic_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Sedes de várias clínicas de uma vez, para evitar N+1 na listagem.
    pub async fn branches_for<'e, E>(
        &self,
        executor: E,
        clinic_ids: &[Uuid],
    ) -> Result<Vec<Branch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branches = sqlx::query_as::<_, Branch>(
            r#"
            SELECT id, clinic_id, name, address, phone, service_code
            FROM clinic_branches
            WHERE clinic_id = ANY($1)
            ORDER BY name ASC
            "#,
        )
        .bind(clinic_ids)
        .fetch_all(executor)
        .await?;

        Ok(branches)
    }
}
