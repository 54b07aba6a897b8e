// src/services/auth.rs

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, Identity, User},
};

/// Tokens valem uma hora; não há refresh.
pub const TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::minutes(TOKEN_TTL_MINUTES),
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        self.issue_with_times(identity, now.timestamp(), (now + self.ttl).timestamp())
    }

    fn issue_with_times(&self, identity: &Identity, iat: i64, exp: i64) -> Result<String, AppError> {
        let claims = Claims {
            identity: identity.clone(),
            exp: exp.max(0) as usize,
            iat: iat.max(0) as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    /// Assinatura inválida, token malformado e token expirado dão o mesmo erro.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims.identity)
        .map_err(|e| {
            tracing::debug!("token rejeitado: {}", e);
            AppError::InvalidToken
        })
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: TokenService) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn login_user(
        &self,
        document_number: &str,
        password: &str,
    ) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_document_number(document_number)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.password_matches(&user, password).await? {
            tracing::warn!(document_number, "tentativa de login com senha incorreta");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&Identity::from(&user))?;
        tracing::info!(user_id = %user.id, role = ?user.role, "login bem-sucedido");

        Ok(AuthResponse { token, user })
    }

    pub fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        self.tokens.verify(token)
    }

    async fn password_matches(&self, user: &User, password: &str) -> Result<bool, AppError> {
        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        Ok(is_valid)
    }
}
