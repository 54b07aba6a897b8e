// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Doctor,
}

impl Role {
    /// Só o superadmin enxerga todas as clínicas.
    pub fn is_superadmin(self) -> bool {
        matches!(self, Role::Superadmin)
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "1020304050")]
    pub document_number: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub clinic_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "El número de documento es requerido."))]
    #[schema(example = "1020304050")]
    pub document_number: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "La contraseña es requerida."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Quem está chamando, tal como veio no token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: Uuid,
    pub document_number: String,
    pub role: Role,
    pub clinic_id: Option<Uuid>,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            document_number: user.document_number.clone(),
            role: user.role,
            clinic_id: user.clinic_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyTokenResponse {
    #[schema(example = "Token válido")]
    pub message: String,
    pub user: Identity,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Identity,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
