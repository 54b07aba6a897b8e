// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ClinicRepository, PatientRepository, UserRepository},
    middleware::access::AccessGate,
    services::{
        auth::{AuthService, TokenService},
        ClinicService, PatientService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            database_url,
            jwt_secret,
            port: parse_or("PORT", 5000)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(parse_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} inválido: {raw}")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub cors_allow_origin: Option<String>,
    pub auth_service: AuthService,
    pub access_gate: AccessGate,
    pub clinic_service: ClinicService,
    pub patient_service: PatientService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let mut state = Self::with_pool(db_pool, &config.jwt_secret);
        state.cors_allow_origin = config.cors_allow_origin.clone();
        Ok(state)
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, jwt_secret: &str) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let clinic_repo = ClinicRepository::new(db_pool.clone());
        let patient_repo = PatientRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, TokenService::new(jwt_secret));
        let access_gate = AccessGate::new(Arc::new(patient_repo.clone()));
        let clinic_service = ClinicService::new(clinic_repo.clone());
        let patient_service = PatientService::new(patient_repo, clinic_repo, db_pool.clone());

        Self {
            db_pool,
            cors_allow_origin: None,
            auth_service,
            access_gate,
            clinic_service,
            patient_service,
        }
    }
}
