//! PostgreSQL implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tenancy_core::error::TenancyResult;
use tenancy_core::models::user::{CreateUser, User};
use tenancy_core::repository::UserRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::timestamp;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    created_at: Option<DateTime<Utc>>,
    email: String,
    verified: Option<bool>,
    tenant_id: Uuid,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: row.created_at,
            email: row.email,
            verified: row.verified,
            tenant_id: row.tenant_id,
        }
    }
}

/// PostgreSQL implementation of the User repository.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    async fn create(&self, input: CreateUser) -> TenancyResult<User> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (id, created_at, email, verified, tenant_id) \
             VALUES (COALESCE($1, gen_random_uuid()), COALESCE($2, NOW()), $3, \
             COALESCE($4, false), $5) \
             RETURNING id, created_at, email, verified, tenant_id",
        )
        .bind(input.id)
        .bind(input.created_at.map(timestamp::to_column_precision))
        .bind(input.email)
        .bind(input.verified)
        .bind(input.tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> TenancyResult<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, created_at, email, verified, tenant_id FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::not_found("user", id))?;
        Ok(row.into())
    }

    async fn get_by_email(&self, email: &str) -> TenancyResult<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, created_at, email, verified, tenant_id FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::not_found("user", format!("email={email}")))?;
        Ok(row.into())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> TenancyResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, created_at, email, verified, tenant_id FROM users \
             WHERE tenant_id = $1 ORDER BY created_at ASC, email ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn delete(&self, id: Uuid) -> TenancyResult<()> {
        // session.user_id does not cascade, so sessions go first.
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        sqlx::query("DELETE FROM \"session\" WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id).into());
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }
}
