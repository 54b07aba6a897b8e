pub mod user_repo;
pub use user_repo::UserRepository;
pub mod clinic_repo;
pub use clinic_repo::ClinicRepository;
pub mod patient_repo;
pub use patient_repo::PatientRepository;
