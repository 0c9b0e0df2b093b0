//! Tenant domain model.
//!
//! Tenants are the root of data partitioning. Users, sessions and
//! subscriptions all reference a tenant and are removed with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isolated customer account, as stored in `tenants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Defaults to `NOW()`; the column is nullable.
    pub created_at: Option<DateTime<Utc>>,
    /// Defaults to `false`; the column is nullable.
    pub verified: Option<bool>,
    /// Unique across tenants when present.
    pub stripe_customer_id: Option<String>,
}

/// Fields accepted when inserting a tenant.
///
/// Every column has a default or is nullable, so `CreateTenant::default()`
/// is a valid insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Generated by the database when `None`.
    pub id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub verified: Option<bool>,
    pub stripe_customer_id: Option<String>,
}
