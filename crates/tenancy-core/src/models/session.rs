//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server-side login record, as stored in `session`.
///
/// `tenant_id` duplicates the user's tenant so tenant-scoped lookups
/// need no join. It must always equal the referenced user's `tenant_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token handed to the client.
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub tenant_id: Uuid,
}

impl Session {
    /// Whether the session is still active at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// No column of `session` has a default, so the insert shape carries
/// every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub tenant_id: Uuid,
}

impl From<CreateSession> for Session {
    fn from(input: CreateSession) -> Self {
        Self {
            id: input.id,
            user_id: input.user_id,
            expires_at: input.expires_at,
            tenant_id: input.tenant_id,
        }
    }
}
