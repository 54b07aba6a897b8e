pub mod auth;
pub mod clinic_service;
pub use clinic_service::ClinicService;
pub mod patient_service;
pub use patient_service::PatientService;
