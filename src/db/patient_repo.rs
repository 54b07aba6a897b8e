// src/db/patient_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    middleware::access::OwnershipLookup,
    models::patient::{Patient, PatientPayload},
};

const PATIENT_COLUMNS: &str = r#"
    id, clinic_id, first_name, last_name, document_type, document_number,
    birth_date, gender, address, phone, email, blood_type, allergies,
    medical_history, created_at, updated_at
"#;

#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_patient<'e, E>(
        &self,
        executor: E,
        clinic_id: Uuid,
        payload: &PatientPayload,
    ) -> Result<Patient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO patients (
                clinic_id, first_name, last_name, document_type, document_number,
                birth_date, gender, address, phone, email, blood_type,
                allergies, medical_history
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {PATIENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Patient>(&sql)
            .bind(clinic_id)
            .bind(&payload.first_name)
            .bind(&payload.last_name)
            .bind(&payload.document_type)
            .bind(&payload.document_number)
            .bind(payload.birth_date)
            .bind(&payload.gender)
            .bind(&payload.address)
            .bind(&payload.phone)
            .bind(&payload.email)
            .bind(&payload.blood_type)
            .bind(&payload.allergies)
            .bind(&payload.medical_history)
            .fetch_one(executor)
            .await
            .map_err(map_constraint_error)
    }

    /// Substitui todos os campos. `None` quando o id não existe dentro de `scope`.
    pub async fn update_patient<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
        clinic_id: Uuid,
        payload: &PatientPayload,
    ) -> Result<Option<Patient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE patients
            SET clinic_id = $2, first_name = $3, last_name = $4, document_type = $5,
                document_number = $6, birth_date = $7, gender = $8, address = $9,
                phone = $10, email = $11, blood_type = $12, allergies = $13,
                medical_history = $14, updated_at = now()
            WHERE id = $1 AND ($15::uuid IS NULL OR clinic_id = $15)
            RETURNING {PATIENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Patient>(&sql)
            .bind(id)
            .bind(clinic_id)
            .bind(&payload.first_name)
            .bind(&payload.last_name)
            .bind(&payload.document_type)
            .bind(&payload.document_number)
            .bind(payload.birth_date)
            .bind(&payload.gender)
            .bind(&payload.address)
            .bind(&payload.phone)
            .bind(&payload.email)
            .bind(&payload.blood_type)
            .bind(&payload.allergies)
            .bind(&payload.medical_history)
            .bind(scope)
            .fetch_optional(executor)
            .await
            .map_err(map_constraint_error)
    }

    pub async fn delete_patient<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM patients WHERE id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// `clinic_id = None` lista todas as clínicas.
    pub async fn list_patients<'e, E>(
        &self,
        executor: E,
        clinic_id: Option<Uuid>,
    ) -> Result<Vec<Patient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE ($1::uuid IS NULL OR clinic_id = $1)
            ORDER BY last_name ASC, first_name ASC
            "#
        );

        let patients = sqlx::query_as::<_, Patient>(&sql)
            .bind(clinic_id)
            .fetch_all(executor)
            .await?;

        Ok(patients)
    }

    pub async fn find_patient<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        clinic_id: Option<Uuid>,
    ) -> Result<Option<Patient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE id = $1 AND ($2::uuid IS NULL OR clinic_id = $2)
            "#
        );

        let patient = sqlx::query_as::<_, Patient>(&sql)
            .bind(id)
            .bind(clinic_id)
            .fetch_optional(executor)
            .await?;

        Ok(patient)
    }
}

#[async_trait]
impl OwnershipLookup for PatientRepository {
    async fn owning_clinic(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
        let clinic_id = sqlx::query_scalar::<_, Uuid>("SELECT clinic_id FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(clinic_id)
    }
}
