//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    /// Globally unique, not per tenant.
    pub email: String,
    pub verified: Option<bool>,
    pub tenant_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub email: String,
    pub verified: Option<bool>,
    pub tenant_id: Uuid,
}

impl CreateUser {
    /// Insert shape with only the required columns set.
    pub fn new(tenant_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id: None,
            created_at: None,
            email: email.into(),
            verified: None,
            tenant_id,
        }
    }
}
