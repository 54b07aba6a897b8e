// src/handlers/patients.rs

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
    models::{
        clinic::{CreatedResponse, MessageResponse},
        patient::{Patient, PatientPayload},
    },
};

// GET /api/patients
#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "Patients",
    responses(
        (status = 200, description = "Pacientes visíveis para o chamador", body = Vec<Patient>),
        (status = 403, description = "Usuário sem clínica associada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_patients(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let grant = app_state
        .access_gate
        .enforce(&user.0, AccessRequest::collection(Resource::Patient, Action::List))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let patients = app_state
        .patient_service
        .list_patients(grant.scope)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(patients)))
}

// GET /api/patients/{id}
#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente", body = Patient),
        (status = 403, description = "Paciente de outra clínica"),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let grant = app_state
        .access_gate
        .enforce(&user.0, AccessRequest::item(Resource::Patient, Action::Read, id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let patient = app_state
        .patient_service
        .get_patient(id, grant.scope)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(patient)))
}

// POST /api/patients
#[utoipa::path(
    post,
    path = "/api/patients",
    tag = "Patients",
    request_body = PatientPayload,
    responses(
        (status = 201, description = "Paciente criado", body = CreatedResponse),
        (status = 400, description = "Dados inválidos ou clínica inexistente"),
        (status = 403, description = "Clínica de outro tenant"),
        (status = 409, description = "document_number já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // O gate decide antes de qualquer erro de parse ser devolvido
    let parsed = parse_body::<PatientPayload>(&body);
    let requested_clinic = parsed.as_ref().ok().and_then(|p| p.clinic_id);

    let grant = app_state
        .access_gate
        .enforce(
            &user.0,
            AccessRequest::collection(Resource::Patient, Action::Create).with_clinic(requested_clinic),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let payload = parsed.map_err(|e| e.to_api_error(&locale))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let patient = app_state
        .patient_service
        .create_patient(&grant, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Paciente creado exitosamente.".to_string(),
            id: patient.id,
        }),
    ))
}

// PUT /api/patients/{id}
#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    request_body = PatientPayload,
    responses(
        (status = 200, description = "Paciente atualizado", body = Patient),
        (status = 400, description = "Dados inválidos ou clínica inexistente"),
        (status = 403, description = "Paciente ou clínica de outro tenant"),
        (status = 404, description = "Paciente não encontrado"),
        (status = 409, description = "document_number já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let parsed = parse_body::<PatientPayload>(&body);
    let requested_clinic = parsed.as_ref().ok().and_then(|p| p.clinic_id);

    let grant = app_state
        .access_gate
        .enforce(
            &user.0,
            AccessRequest::item(Resource::Patient, Action::Update, id).with_clinic(requested_clinic),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let payload = parsed.map_err(|e| e.to_api_error(&locale))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let patient = app_state
        .patient_service
        .update_patient(id, &grant, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(patient)))
}

// DELETE /api/patients/{id}
#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente removido", body = MessageResponse),
        (status = 403, description = "Paciente de outra clínica"),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let grant = app_state
        .access_gate
        .enforce(&user.0, AccessRequest::item(Resource::Patient, Action::Delete, id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .patient_service
        .delete_patient(id, grant.scope)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Paciente eliminado exitosamente.".to_string(),
        }),
    ))
}
