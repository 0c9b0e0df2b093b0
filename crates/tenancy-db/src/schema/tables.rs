//! The canonical table definitions.
//!
//! Column names, types, defaults and constraints here are the migration
//! contract; changing them requires a new migration.

use super::{Column, ColumnDefault, ColumnType, ForeignKey, Index, ReferentialAction, Schema, Table};

pub const TENANTS: &str = "tenants";
pub const USERS: &str = "users";
pub const SESSIONS: &str = "session";
pub const SUBSCRIPTIONS: &str = "subscriptions";

/// All tables, parents before children.
pub fn schema() -> Schema {
    Schema::new(vec![tenants(), users(), sessions(), subscriptions()])
}

pub fn tenants() -> Table {
    Table::new(TENANTS)
        .column(
            Column::new("id", ColumnType::Uuid)
                .primary_key()
                .default(ColumnDefault::RandomUuid),
        )
        .column(Column::new("created_at", ColumnType::timestamp()).default(ColumnDefault::Now))
        .column(Column::new("verified", ColumnType::Boolean).default(ColumnDefault::Bool(false)))
        .column(Column::new("stripe_customer_id", ColumnType::Text))
        .index(Index::unique(
            "idx_tenants_stripe_customer_id",
            ["stripe_customer_id"],
        ))
}

pub fn users() -> Table {
    Table::new(USERS)
        .column(
            Column::new("id", ColumnType::Uuid)
                .primary_key()
                .default(ColumnDefault::RandomUuid),
        )
        .column(Column::new("created_at", ColumnType::timestamp()).default(ColumnDefault::Now))
        .column(Column::new("email", ColumnType::Text).not_null())
        .column(Column::new("verified", ColumnType::Boolean).default(ColumnDefault::Bool(false)))
        .column(Column::new("tenant_id", ColumnType::Uuid).not_null())
        .foreign_key(tenant_fk())
        .index(Index::new("idx_users_tenant_id", ["tenant_id"]))
        .index(Index::unique("idx_users_email", ["email"]))
}

pub fn sessions() -> Table {
    Table::new(SESSIONS)
        .column(Column::new("id", ColumnType::Text).primary_key())
        .column(Column::new("user_id", ColumnType::Uuid).not_null())
        .column(Column::new("expires_at", ColumnType::timestamp()).not_null())
        .column(Column::new("tenant_id", ColumnType::Uuid).not_null())
        .foreign_key(ForeignKey::new("user_id", USERS, "id"))
        .foreign_key(tenant_fk())
}

pub fn subscriptions() -> Table {
    Table::new(SUBSCRIPTIONS)
        .column(Column::new("id", ColumnType::Text).primary_key())
        .column(
            Column::new("type", ColumnType::Text)
                .not_null()
                .enum_values(["free", "paid"]),
        )
        .column(Column::new("created_at", ColumnType::timestamp()).default(ColumnDefault::Now))
        .column(Column::new("updated_at", ColumnType::timestamp()))
        .column(Column::new("current_period_start", ColumnType::timestamp()).not_null())
        .column(Column::new("current_period_end", ColumnType::timestamp()).not_null())
        .column(Column::new("tenant_id", ColumnType::Uuid).not_null())
        .foreign_key(tenant_fk())
        .index(Index::new("idx_subscriptions_tenant_id", ["tenant_id"]))
}

fn tenant_fk() -> ForeignKey {
    ForeignKey::new("tenant_id", TENANTS, "id").on_delete(ReferentialAction::Cascade)
}
