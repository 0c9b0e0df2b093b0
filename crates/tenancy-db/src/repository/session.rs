//! PostgreSQL implementation of [`SessionRepository`].
//!
//! This is the storage adapter behind the session service: it reads and
//! writes the `session` table and joins `users` when a session is
//! validated.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tenancy_core::error::TenancyResult;
use tenancy_core::models::session::{CreateSession, Session};
use tenancy_core::models::user::User;
use tenancy_core::repository::SessionRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::timestamp;

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    tenant_id: Uuid,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            expires_at: row.expires_at,
            tenant_id: row.tenant_id,
        }
    }
}

/// Session joined with its user; user columns are prefixed to avoid
/// clashing with the session's own `id` and `tenant_id`.
#[derive(Debug, sqlx::FromRow)]
struct SessionUserRow {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    tenant_id: Uuid,
    user_created_at: Option<DateTime<Utc>>,
    user_email: String,
    user_verified: Option<bool>,
    user_tenant_id: Uuid,
}

impl SessionUserRow {
    fn into_parts(self) -> (Session, User) {
        let user = User {
            id: self.user_id,
            created_at: self.user_created_at,
            email: self.user_email,
            verified: self.user_verified,
            tenant_id: self.user_tenant_id,
        };
        let session = Session {
            id: self.id,
            user_id: self.user_id,
            expires_at: self.expires_at,
            tenant_id: self.tenant_id,
        };
        (session, user)
    }
}

/// PostgreSQL implementation of the Session repository.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for PgSessionRepository {
    async fn create(&self, input: CreateSession) -> TenancyResult<Session> {
        let row: SessionRow = sqlx::query_as(
            "INSERT INTO \"session\" (id, user_id, expires_at, tenant_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, expires_at, tenant_id",
        )
        .bind(input.id)
        .bind(input.user_id)
        .bind(timestamp::to_column_precision(input.expires_at))
        .bind(input.tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.into())
    }

    async fn get_with_user(&self, id: &str) -> TenancyResult<(Session, User)> {
        let row: Option<SessionUserRow> = sqlx::query_as(
            "SELECT s.id, s.user_id, s.expires_at, s.tenant_id, \
             u.created_at AS user_created_at, u.email AS user_email, \
             u.verified AS user_verified, u.tenant_id AS user_tenant_id \
             FROM \"session\" s \
             INNER JOIN users u ON u.id = s.user_id \
             WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::not_found("session", id))?;
        Ok(row.into_parts())
    }

    async fn list_by_user(&self, user_id: Uuid) -> TenancyResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, user_id, expires_at, tenant_id FROM \"session\" \
             WHERE user_id = $1 ORDER BY expires_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    async fn update_expiration(&self, id: &str, expires_at: DateTime<Utc>) -> TenancyResult<()> {
        let result = sqlx::query("UPDATE \"session\" SET expires_at = $2 WHERE id = $1")
            .bind(id)
            .bind(timestamp::to_column_precision(expires_at))
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("session", id).into());
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> TenancyResult<()> {
        sqlx::query("DELETE FROM \"session\" WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> TenancyResult<()> {
        sqlx::query("DELETE FROM \"session\" WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> TenancyResult<u64> {
        let result = sqlx::query("DELETE FROM \"session\" WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(result.rows_affected())
    }
}
