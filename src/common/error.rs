use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::{self, MessageKey};
use crate::middleware::access::Denial;
use crate::middleware::i18n::Locale;

// Erros de domínio. Cada variante sabe o seu status HTTP e a sua mensagem traduzível.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Campo obrigatório ausente: {0}")]
    MissingField(&'static str),

    #[error("A clínica referenciada não existe")]
    ClinicNotFound,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token ausente")]
    MissingToken,

    #[error("Token inválido ou expirado")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(Denial),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(&'static str),

    #[error("A clínica ainda possui pacientes")]
    ClinicInUse,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// A resposta HTTP final: status + mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedBody(_)
            | AppError::MissingField(_)
            | AppError::ClinicNotFound => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::MissingToken => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UniqueConstraintViolation(_) | AppError::ClinicInUse => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> MessageKey {
        match self {
            AppError::ValidationError(_) => MessageKey::Validation,
            AppError::MalformedBody(_) => MessageKey::MalformedBody,
            AppError::MissingField(_) => MessageKey::MissingField,
            AppError::ClinicNotFound => MessageKey::ClinicNotFound,
            AppError::InvalidCredentials => MessageKey::InvalidCredentials,
            AppError::MissingToken => MessageKey::MissingToken,
            AppError::InvalidToken => MessageKey::InvalidToken,
            AppError::Forbidden(Denial::RoleNotPermitted) => MessageKey::RoleNotPermitted,
            AppError::Forbidden(Denial::NoClinicAssigned) => MessageKey::NoClinicAssigned,
            AppError::Forbidden(Denial::ForeignTenant) => MessageKey::ForeignTenant,
            AppError::Forbidden(Denial::Missing) | AppError::NotFound(_) => MessageKey::NotFound,
            AppError::UniqueConstraintViolation(_) => MessageKey::Duplicate,
            AppError::ClinicInUse => MessageKey::ClinicInUse,
            _ => MessageKey::Internal,
        }
    }

    /// Converte o erro de domínio na resposta HTTP, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let template = i18n::translate(self.message_key(), &locale.0);
        let error = match self {
            AppError::MissingField(field) | AppError::UniqueConstraintViolation(field) => {
                template.replace("{field}", field)
            }
            AppError::NotFound(resource) => template.replace("{field}", resource),
            _ => template.to_string(),
        };

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Para rejeições de extratores, onde não temos o idioma do cliente à mão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error(&Locale::default())
    }
}

/// Traduz violações de unicidade/chave estrangeira do Postgres em erros de domínio.
pub(crate) fn map_constraint_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("clinics_tax_id_key") => "tax_id",
                Some("patients_document_number_key") => "document_number",
                Some("users_document_number_key") => "document_number",
                _ => "unique",
            };
            return AppError::UniqueConstraintViolation(field);
        }
        if db_err.is_foreign_key_violation()
            && db_err.constraint() == Some("patients_clinic_id_fkey")
        {
            return AppError::ClinicNotFound;
        }
    }
    AppError::DatabaseError(e)
}

/// No DELETE de uma clínica, a única FK que pode falhar é a dos pacientes.
pub(crate) fn map_clinic_delete_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => AppError::ClinicInUse,
        _ => map_constraint_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn es() -> Locale {
        Locale("es".to_string())
    }

    // Erro de driver com o texto que um Postgres em espanhol devolveria
    #[derive(Debug)]
    struct FakePgError {
        foreign_key: bool,
        constraint: &'static str,
        message: &'static str,
    }

    impl std::fmt::Display for FakePgError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for FakePgError {}

    impl sqlx::error::DatabaseError for FakePgError {
        fn message(&self) -> &str {
            self.message
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.foreign_key {
                sqlx::error::ErrorKind::ForeignKeyViolation
            } else {
                sqlx::error::ErrorKind::UniqueViolation
            }
        }
    }

    fn fk_violation(message: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakePgError {
            foreign_key: true,
            constraint: "patients_clinic_id_fkey",
            message,
        }))
    }

    #[test]
    fn deleting_a_referenced_clinic_is_a_conflict_in_any_server_locale() {
        for message in [
            "update or delete on table \"clinics\" violates foreign key constraint",
            "update o delete en «clinics» viola la llave foránea «patients_clinic_id_fkey»",
        ] {
            let err = map_clinic_delete_error(fk_violation(message));
            assert!(matches!(err, AppError::ClinicInUse), "{message}");
            assert_eq!(err.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn patient_pointing_at_unknown_clinic_is_a_client_error() {
        let err = map_constraint_error(fk_violation(
            "inserción o actualización en la tabla «patients» viola la llave foránea",
        ));
        assert!(matches!(err, AppError::ClinicNotFound));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unique_violation_is_named_by_constraint() {
        let err = map_constraint_error(sqlx::Error::Database(Box::new(FakePgError {
            foreign_key: false,
            constraint: "clinics_tax_id_key",
            message: "llave duplicada viola restricción de unicidad",
        })));
        assert!(matches!(err, AppError::UniqueConstraintViolation("tax_id")));
    }

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(AppError::MissingField("name").status(), StatusCode::BAD_REQUEST);
        let syntax = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(AppError::MalformedBody(syntax).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ClinicNotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Forbidden(Denial::ForeignTenant).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotFound("patient").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UniqueConstraintViolation("tax_id").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_internal_detail() {
        let api = AppError::InternalServerError(anyhow::anyhow!("pool timed out")).to_api_error(&es());
        assert!(!api.error.contains("pool"));
    }

    #[test]
    fn duplicate_message_names_the_field() {
        let api = AppError::UniqueConstraintViolation("document_number")
            .to_api_error(&Locale("en".to_string()));
        assert!(api.error.contains("document_number"));
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("email", validator::ValidationError::new("email"));
        let api = AppError::ValidationError(errors).to_api_error(&es());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["email"][0], "email");
    }
}
