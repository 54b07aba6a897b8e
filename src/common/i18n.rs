// src/common/i18n.rs

// Catálogo de mensagens exibidas ao cliente. Espanhol é o idioma padrão.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Validation,
    MalformedBody,
    MissingField,
    ClinicNotFound,
    InvalidCredentials,
    MissingToken,
    InvalidToken,
    RoleNotPermitted,
    NoClinicAssigned,
    ForeignTenant,
    NotFound,
    Duplicate,
    ClinicInUse,
    Internal,
}

pub const DEFAULT_LANG: &str = "es";

/// Devolve o modelo da mensagem; `{field}` é substituído pelo chamador.
pub fn translate(key: MessageKey, lang: &str) -> &'static str {
    match lang {
        "en" => english(key),
        _ => spanish(key),
    }
}

fn spanish(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Validation => "Uno o más campos son inválidos.",
        MessageKey::MalformedBody => "El cuerpo de la solicitud no es un JSON válido.",
        MessageKey::MissingField => "El campo {field} es requerido.",
        MessageKey::ClinicNotFound => "El ID de la clínica especificada no existe.",
        MessageKey::InvalidCredentials => "Credenciales inválidas.",
        MessageKey::MissingToken => "Acceso denegado. No se proporcionó token.",
        MessageKey::InvalidToken => "Token inválido o expirado.",
        MessageKey::RoleNotPermitted => "Acceso denegado: No tienes los permisos necesarios.",
        MessageKey::NoClinicAssigned => "Acceso denegado: Usuario no asociado a ninguna clínica.",
        MessageKey::ForeignTenant => "Acceso denegado: No puedes acceder a recursos de otras clínicas.",
        MessageKey::NotFound => "Recurso no encontrado: {field}.",
        MessageKey::Duplicate => "Ya existe un registro con este {field}.",
        MessageKey::ClinicInUse => "La clínica todavía tiene pacientes asociados.",
        MessageKey::Internal => "Error interno del servidor.",
    }
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Validation => "One or more fields are invalid.",
        MessageKey::MalformedBody => "The request body is not valid JSON.",
        MessageKey::MissingField => "The field {field} is required.",
        MessageKey::ClinicNotFound => "The specified clinic does not exist.",
        MessageKey::InvalidCredentials => "Invalid credentials.",
        MessageKey::MissingToken => "Access denied. No token provided.",
        MessageKey::InvalidToken => "Invalid or expired token.",
        MessageKey::RoleNotPermitted => "Access denied: insufficient permissions.",
        MessageKey::NoClinicAssigned => "Access denied: user is not assigned to a clinic.",
        MessageKey::ForeignTenant => "Access denied: resource belongs to another clinic.",
        MessageKey::NotFound => "Resource not found: {field}.",
        MessageKey::Duplicate => "A record with this {field} already exists.",
        MessageKey::ClinicInUse => "The clinic still has patients.",
        MessageKey::Internal => "Internal server error.",
    }
}
