//! Session authentication error types.

use tenancy_core::error::TenancyError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid session")]
    InvalidSession,

    #[error("session has expired")]
    SessionExpired,

    #[error("user {user_id} does not belong to tenant {tenant_id}")]
    TenantMismatch { user_id: Uuid, tenant_id: Uuid },

    #[error("session lifetime of {secs} seconds is out of range")]
    InvalidLifetime { secs: u64 },

    #[error(transparent)]
    Repository(#[from] TenancyError),
}

impl From<AuthError> for TenancyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Repository(inner) => inner,
            AuthError::InvalidLifetime { .. } => TenancyError::Internal(err.to_string()),
            AuthError::InvalidSession
            | AuthError::SessionExpired
            | AuthError::TenantMismatch { .. } => TenancyError::AuthenticationFailed {
                reason: err.to_string(),
            },
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
