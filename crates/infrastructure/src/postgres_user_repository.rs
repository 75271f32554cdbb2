//! PostgreSQL-backed credential lookup.

use async_trait::async_trait;
use sqlx::PgPool;

use portico_application::{UserCredentials, UserRepository};
use portico_core::AppResult;
use portico_domain::{EmailAddress, UserId};

use crate::postgres_support::database_error;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    id: uuid::Uuid,
    password_hash: Option<String>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, password_hash
            FROM users
            WHERE lower(email) = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to find user by email", error))?;

        Ok(row.map(|row| UserCredentials {
            user_id: UserId::from_uuid(row.id),
            password_hash: row.password_hash,
        }))
    }
}
