//! PostgreSQL implementation of [`SubscriptionRepository`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tenancy_core::error::TenancyResult;
use tenancy_core::models::subscription::{
    CreateSubscription, Subscription, SubscriptionType, UpdateSubscription,
};
use tenancy_core::repository::SubscriptionRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::timestamp;

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    #[sqlx(rename = "type")]
    kind: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
    tenant_id: Uuid,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let kind: SubscriptionType = row.kind.parse().map_err(|_| DbError::InvalidColumn {
            column: "subscriptions.type".into(),
            value: row.kind.clone(),
        })?;
        Ok(Subscription {
            id: row.id,
            kind,
            created_at: row.created_at,
            updated_at: row.updated_at,
            current_period_start: row.current_period_start,
            current_period_end: row.current_period_end,
            tenant_id: row.tenant_id,
        })
    }
}

/// PostgreSQL implementation of the Subscription repository.
#[derive(Debug, Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(&self, input: CreateSubscription) -> TenancyResult<Subscription> {
        input.validate()?;

        let row: SubscriptionRow = sqlx::query_as(
            "INSERT INTO subscriptions \
             (id, type, created_at, updated_at, current_period_start, current_period_end, tenant_id) \
             VALUES ($1, $2, COALESCE($3, NOW()), $4, $5, $6, $7) \
             RETURNING id, type, created_at, updated_at, \
             current_period_start, current_period_end, tenant_id",
        )
        .bind(input.id)
        .bind(input.kind.as_str())
        .bind(input.created_at.map(timestamp::to_column_precision))
        .bind(input.updated_at.map(timestamp::to_column_precision))
        .bind(timestamp::to_column_precision(input.current_period_start))
        .bind(timestamp::to_column_precision(input.current_period_end))
        .bind(input.tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(Subscription::try_from(row)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: &str) -> TenancyResult<Subscription> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            "SELECT id, type, created_at, updated_at, \
             current_period_start, current_period_end, tenant_id \
             FROM subscriptions WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::not_found("subscription", id))?;
        Ok(Subscription::try_from(row)?)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> TenancyResult<Vec<Subscription>> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            "SELECT id, type, created_at, updated_at, \
             current_period_start, current_period_end, tenant_id \
             FROM subscriptions WHERE tenant_id = $1 \
             ORDER BY current_period_start ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(Subscription::try_from)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: &str,
        input: UpdateSubscription,
    ) -> TenancyResult<Subscription> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Lock the row so the merged period is validated against the
        // values actually being replaced.
        let current: Option<SubscriptionRow> = sqlx::query_as(
            "SELECT id, type, created_at, updated_at, \
             current_period_start, current_period_end, tenant_id \
             FROM subscriptions WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let current = current.ok_or_else(|| DbError::not_found("subscription", id))?;
        let updated = input.apply_to(&Subscription::try_from(current)?)?;

        let row: SubscriptionRow = sqlx::query_as(
            "UPDATE subscriptions SET type = $3, current_period_start = $4, \
             current_period_end = $5, updated_at = NOW() \
             WHERE tenant_id = $1 AND id = $2 \
             RETURNING id, type, created_at, updated_at, \
             current_period_start, current_period_end, tenant_id",
        )
        .bind(tenant_id)
        .bind(id)
        .bind(updated.kind.as_str())
        .bind(timestamp::to_column_precision(updated.current_period_start))
        .bind(timestamp::to_column_precision(updated.current_period_end))
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        Ok(Subscription::try_from(row)?)
    }

    async fn delete(&self, tenant_id: Uuid, id: &str) -> TenancyResult<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("subscription", id).into());
        }

        Ok(())
    }
}
