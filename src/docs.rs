// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::verify_token,

        // --- Clinics ---
        handlers::clinics::create_clinic,
        handlers::clinics::list_clinics,
        handlers::clinics::get_clinic,
        handlers::clinics::update_clinic,
        handlers::clinics::delete_clinic,

        // --- Patients ---
        handlers::patients::list_patients,
        handlers::patients::get_patient,
        handlers::patients::create_patient,
        handlers::patients::update_patient,
        handlers::patients::delete_patient,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::Identity,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::VerifyTokenResponse,

            // --- Clinics ---
            models::clinic::ClinicStatus,
            models::clinic::Clinic,
            models::clinic::Branch,
            models::clinic::ClinicPayload,
            models::clinic::BranchPayload,
            models::clinic::CreatedResponse,
            models::clinic::MessageResponse,

            // --- Patients ---
            models::patient::Patient,
            models::patient::PatientPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e verificação de token"),
        (name = "Clinics", description = "Clínicas (tenants) e as suas sedes"),
        (name = "Patients", description = "Pacientes, isolados por clínica")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/auth/verify-token",
            "/api/clinics",
            "/api/clinics/{id}",
            "/api/patients",
            "/api/patients/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} ausente");
        }
    }
}
