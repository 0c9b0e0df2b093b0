//! PostgreSQL implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tenancy_core::error::TenancyResult;
use tenancy_core::models::tenant::{CreateTenant, Tenant};
use tenancy_core::repository::TenantRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::timestamp;

#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    created_at: Option<DateTime<Utc>>,
    verified: Option<bool>,
    stripe_customer_id: Option<String>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            created_at: row.created_at,
            verified: row.verified,
            stripe_customer_id: row.stripe_customer_id,
        }
    }
}

/// PostgreSQL implementation of the Tenant repository.
#[derive(Debug, Clone)]
pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TenantRepository for PgTenantRepository {
    async fn create(&self, input: CreateTenant) -> TenancyResult<Tenant> {
        let row: TenantRow = sqlx::query_as(
            "INSERT INTO tenants (id, created_at, verified, stripe_customer_id) \
             VALUES (COALESCE($1, gen_random_uuid()), COALESCE($2, NOW()), \
             COALESCE($3, false), $4) \
             RETURNING id, created_at, verified, stripe_customer_id",
        )
        .bind(input.id)
        .bind(input.created_at.map(timestamp::to_column_precision))
        .bind(input.verified)
        .bind(input.stripe_customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> TenancyResult<Tenant> {
        let row: Option<TenantRow> = sqlx::query_as(
            "SELECT id, created_at, verified, stripe_customer_id \
             FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::not_found("tenant", id))?;
        Ok(row.into())
    }

    async fn get_by_stripe_customer_id(&self, stripe_customer_id: &str) -> TenancyResult<Tenant> {
        let row: Option<TenantRow> = sqlx::query_as(
            "SELECT id, created_at, verified, stripe_customer_id \
             FROM tenants WHERE stripe_customer_id = $1",
        )
        .bind(stripe_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| {
            DbError::not_found("tenant", format!("stripe_customer_id={stripe_customer_id}"))
        })?;
        Ok(row.into())
    }

    async fn set_stripe_customer_id(
        &self,
        id: Uuid,
        stripe_customer_id: Option<String>,
    ) -> TenancyResult<Tenant> {
        let row: Option<TenantRow> = sqlx::query_as(
            "UPDATE tenants SET stripe_customer_id = $2 WHERE id = $1 \
             RETURNING id, created_at, verified, stripe_customer_id",
        )
        .bind(id)
        .bind(stripe_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::not_found("tenant", id))?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> TenancyResult<()> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("tenant", id).into());
        }

        Ok(())
    }
}
