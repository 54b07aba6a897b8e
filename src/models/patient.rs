// src/models/patient.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: Uuid,
    pub clinic_id: Uuid,
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Gómez")]
    pub last_name: String,
    #[schema(example = "CC")]
    pub document_type: Option<String>,
    #[schema(example = "1020304050")]
    pub document_number: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[schema(example = "O+")]
    pub blood_type: Option<String>,

    // Texto livre, sem validação estrutural
    pub allergies: Option<String>,
    pub medical_history: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usado tanto na criação quanto na substituição completa (PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PatientPayload {
    // Opcional aqui: para usuários de uma clínica o gate injeta o valor
    pub clinic_id: Option<Uuid>,

    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub last_name: String,

    pub document_type: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub document_number: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[schema(value_type = Option<String>, format = Date, example = "1990-05-17")]
    pub birth_date: Option<NaiveDate>,

    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub medical_history: Option<String>,
}

// Os formulários mandam "" quando a data não foi preenchida
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// O formulário manda email: '' quando o campo fica em branco
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_birth_date_becomes_none() {
        let payload: PatientPayload = serde_json::from_value(json!({
            "first_name": "Ana",
            "last_name": "Gómez",
            "document_number": "1020304050",
            "birth_date": ""
        }))
        .unwrap();

        assert_eq!(payload.birth_date, None);
        assert_eq!(payload.clinic_id, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn blank_email_from_the_form_is_accepted() {
        let payload: PatientPayload = serde_json::from_value(json!({
            "first_name": "Ana",
            "last_name": "Gómez",
            "document_number": "1020304050",
            "email": "",
            "birth_date": ""
        }))
        .unwrap();

        assert_eq!(payload.email, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn malformed_email_is_still_rejected() {
        let payload: PatientPayload = serde_json::from_value(json!({
            "first_name": "Ana",
            "last_name": "Gómez",
            "document_number": "1020304050",
            "email": "no-es-correo"
        }))
        .unwrap();

        assert!(payload.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn birth_date_is_parsed_as_iso_date() {
        let payload: PatientPayload = serde_json::from_value(json!({
            "first_name": "Ana",
            "last_name": "Gómez",
            "document_number": "1020304050",
            "birth_date": "1990-05-17"
        }))
        .unwrap();

        assert_eq!(payload.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[test]
    fn missing_document_number_fails_validation() {
        let payload: PatientPayload =
            serde_json::from_value(json!({ "first_name": "Ana", "last_name": "Gómez" })).unwrap();
        let errors = payload.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("document_number"));
    }

    #[test]
    fn medical_fields_accept_free_text() {
        let payload: PatientPayload = serde_json::from_value(json!({
            "first_name": "Ana",
            "last_name": "Gómez",
            "document_number": "1020304050",
            "allergies": "Penicilina; polen <primavera>",
            "medical_history": "Asma desde 2001.\nSin cirugías."
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
    }
}
