//! Backend de administração de clínicas: clínicas (tenants), sedes e
//! pacientes, com controle de acesso por papel e por clínica.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::{AppState, Config};
pub use routes::build_router;
