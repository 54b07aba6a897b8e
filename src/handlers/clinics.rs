// src/handlers/clinics.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::parse_body,
    middleware::{
        access::{AccessRequest, Action, Resource},
        auth::AuthenticatedUser,
        i18n::Locale,
    },
    models::clinic::{Clinic, ClinicPayload, CreatedResponse, MessageResponse},
};

// POST /api/clinics
#[utoipa::path(
    post,
    path = "/api/clinics",
    tag = "Clinics",
    request_body = ClinicPayload,
    responses(
        (status = 201, description = "Clínica criada com as suas sedes", body = CreatedResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas superadmin"),
        (status = 409, description = "tax_id já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_clinic(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access_gate
        .enforce(&user.0, AccessRequest::collection(Resource::Clinic, Action::Create))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let payload: ClinicPayload = parse_body(&body).map_err(|e| e.to_api_error(&locale))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let clinic = app_state
        .clinic_service
        .create_clinic(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Clínica creada exitosamente.".to_string(),
            id: clinic.id,
        }),
    ))
}

// GET /api/clinics
#[utoipa::path(
    get,
    path = "/api/clinics",
    tag = "Clinics",
    responses(
        (status = 200, description = "Clínicas com as suas sedes", body = Vec<Clinic>),
        (status = 403, description = "Papel sem acesso")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clinics(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access_gate
        .enforce(&user.0, AccessRequest::collection(Resource::Clinic, Action::List))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let clinics = app_state
        .clinic_service
        .list_clinics()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clinics)))
}

// GET /api/clinics/{id}
#[utoipa::path(
    get,
    path = "/api/clinics/{id}",
    tag = "Clinics",
    params(("id" = Uuid, Path, description = "ID da clínica")),
    responses(
        (status = 200, description = "Clínica com as suas sedes", body = Clinic),
        (status = 404, description = "Clínica não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_clinic(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access_gate
        .enforce(&user.0, AccessRequest::item(Resource::Clinic, Action::Read, id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let clinic = app_state
        .clinic_service
        .get_clinic(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clinic)))
}

// PUT /api/clinics/{id}
#[utoipa::path(
    put,
    path = "/api/clinics/{id}",
    tag = "Clinics",
    params(("id" = Uuid, Path, description = "ID da clínica")),
    request_body = ClinicPayload,
    responses(
        (status = 200, description = "Clínica e sedes substituídas", body = Clinic),
        (status = 404, description = "Clínica não encontrada"),
        (status = 409, description = "tax_id já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_clinic(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access_gate
        .enforce(&user.0, AccessRequest::item(Resource::Clinic, Action::Update, id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let payload: ClinicPayload = parse_body(&body).map_err(|e| e.to_api_error(&locale))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let clinic = app_state
        .clinic_service
        .update_clinic(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clinic)))
}

// DELETE /api/clinics/{id}
#[utoipa::path(
    delete,
    path = "/api/clinics/{id}",
    tag = "Clinics",
    params(("id" = Uuid, Path, description = "ID da clínica")),
    responses(
        (status = 200, description = "Clínica removida", body = MessageResponse),
        (status = 404, description = "Clínica não encontrada"),
        (status = 409, description = "Clínica ainda possui pacientes")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_clinic(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access_gate
        .enforce(&user.0, AccessRequest::item(Resource::Clinic, Action::Delete, id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .clinic_service
        .delete_clinic(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Clínica eliminada exitosamente.".to_string(),
        }),
    ))
}
