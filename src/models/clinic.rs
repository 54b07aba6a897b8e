// src/models/clinic.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE clinic_status do banco. Sem regras de transição.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "clinic_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClinicStatus {
    #[default]
    Active,
    Inactive,
    Pending,
    Suspended,
}

// ---
// 1. Clinic (o tenant)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Clinic {
    pub id: Uuid,
    #[schema(example = "Clínica Central")]
    pub name: String,
    #[schema(example = "900123456-7")]
    pub tax_id: String,
    pub address: String,
    pub service_code: String,
    pub phone: String,
    pub email: String,
    pub logo: Option<String>,
    pub small_logo: Option<String>,
    pub status: ClinicStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Preenchido pelo serviço depois da consulta principal
    #[sqlx(skip)]
    pub branches: Vec<Branch>,
}

// ---
// 2. Branch (a "Sede")
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Branch {
    pub id: Uuid,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub clinic_id: Uuid,
    #[schema(example = "Sede Norte")]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub service_code: Option<String>,
}

// O que o cliente envia para criar ou substituir uma clínica
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClinicPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub tax_id: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub address: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub service_code: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub phone: String,

    #[serde(default)]
    #[validate(email(message = "invalid_email"))]
    pub email: String,

    pub logo: Option<String>,
    pub small_logo: Option<String>,

    #[serde(default)]
    pub status: ClinicStatus,

    #[serde(default)]
    #[validate(nested)]
    pub branches: Vec<BranchPayload>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BranchPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub service_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "Clínica creada exitosamente.")]
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
