// src/db/user_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::auth::User};

// O repositório de usuários. Só leitura: o provisionamento acontece fora do serviço.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu número de documento
    pub async fn find_by_document_number(
        &self,
        document_number: &str,
    ) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, document_number, password_hash, first_name, last_name,
                   role, clinic_id, created_at
            FROM users
            WHERE document_number = $1
            "#,
        )
        .bind(document_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }
}
