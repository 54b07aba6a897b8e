// src/handlers/auth.rs

use axum::{body::Bytes, extract::State, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::parse_body,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{AuthResponse, LoginUserPayload, VerifyTokenResponse},
};

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 400, description = "Campos ausentes"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    body: Bytes,
) -> Result<Json<AuthResponse>, ApiError> {
    let payload: LoginUserPayload = parse_body(&body).map_err(|e| e.to_api_error(&locale))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let response = app_state
        .auth_service
        .login_user(&payload.document_number, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(response))
}

// Se o auth_guard deixou passar, o token é válido
#[utoipa::path(
    get,
    path = "/api/auth/verify-token",
    tag = "Auth",
    responses(
        (status = 200, description = "Identidade decodificada do token", body = VerifyTokenResponse),
        (status = 401, description = "Token ausente"),
        (status = 403, description = "Token inválido ou expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_token(AuthenticatedUser(user): AuthenticatedUser) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse {
        message: "Token válido".to_string(),
        user,
    })
}
