//! Session service: creation, validation with sliding expiry, and
//! invalidation of tenant-scoped sessions.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tenancy_core::models::session::{CreateSession, Session};
use tenancy_core::models::user::User;
use tenancy_core::repository::{SessionRepository, UserRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::cookie::{self, Cookie, CookieAttributes};
use crate::error::{AuthError, AuthResult};
use crate::token;

/// Extra values exposed with every validated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAttributes {
    pub tenant_id: Uuid,
}

/// Project the stored row onto the attributes exposed to callers.
pub fn session_attributes(session: &Session) -> SessionAttributes {
    SessionAttributes {
        tenant_id: session.tenant_id,
    }
}

/// A session as handed out by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    /// Set when the session was just created or its expiry was extended;
    /// callers should re-issue the cookie.
    pub fresh: bool,
    pub attributes: SessionAttributes,
}

impl AuthSession {
    fn from_row(session: &Session, fresh: bool) -> Self {
        Self {
            id: session.id.clone(),
            user_id: session.user_id,
            expires_at: session.expires_at,
            fresh,
            attributes: session_attributes(session),
        }
    }
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSession {
    pub session: AuthSession,
    pub user: User,
}

/// Session service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct SessionService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository> SessionService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn lifetime(&self) -> AuthResult<Duration> {
        let secs = self.config.session_lifetime_secs;
        i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .filter(|lifetime| *lifetime > Duration::zero())
            .ok_or(AuthError::InvalidLifetime { secs })
    }

    fn expiry_from(&self, now: DateTime<Utc>, lifetime: Duration) -> AuthResult<DateTime<Utc>> {
        now.checked_add_signed(lifetime)
            .map(|expires_at| expires_at.trunc_subsecs(3))
            .ok_or(AuthError::InvalidLifetime {
                secs: self.config.session_lifetime_secs,
            })
    }

    /// Start a new session for `user_id` inside `tenant_id`.
    pub async fn create_session(&self, user_id: Uuid, tenant_id: Uuid) -> AuthResult<AuthSession> {
        let lifetime = self.lifetime()?;
        let user = self.user_repo.get_by_id(user_id).await?;
        if user.tenant_id != tenant_id {
            warn!(%user_id, %tenant_id, "session requested for a foreign tenant");
            return Err(AuthError::TenantMismatch { user_id, tenant_id });
        }

        let session = self
            .session_repo
            .create(CreateSession {
                id: token::generate_session_id(),
                user_id,
                expires_at: self.expiry_from(Utc::now(), lifetime)?,
                tenant_id,
            })
            .await?;

        info!(%user_id, %tenant_id, expires_at = %session.expires_at, "session created");
        Ok(AuthSession::from_row(&session, true))
    }

    /// Look up a session and its user.
    ///
    /// Expired sessions are deleted. Sessions past the halfway point of
    /// their lifetime get a new expiry and come back `fresh`.
    pub async fn validate_session(&self, session_id: &str) -> AuthResult<ValidatedSession> {
        let (mut session, user) = match self.session_repo.get_with_user(session_id).await {
            Ok(found) => found,
            Err(e) if e.is_not_found() => {
                debug!("session not found");
                return Err(AuthError::InvalidSession);
            }
            Err(e) => return Err(e.into()),
        };

        let lifetime = self.lifetime()?;
        let now = Utc::now();
        if !session.is_active_at(now) {
            debug!(user_id = %session.user_id, "session expired");
            self.session_repo.delete(&session.id).await?;
            return Err(AuthError::SessionExpired);
        }

        let mut fresh = false;
        if session.expires_at - now < lifetime / 2 {
            let expires_at = self.expiry_from(now, lifetime)?;
            match self
                .session_repo
                .update_expiration(&session.id, expires_at)
                .await
            {
                Ok(()) => {}
                // Deleted since it was read.
                Err(e) if e.is_not_found() => return Err(AuthError::InvalidSession),
                Err(e) => return Err(e.into()),
            }
            debug!(user_id = %session.user_id, %expires_at, "session expiry extended");
            session.expires_at = expires_at;
            fresh = true;
        }

        Ok(ValidatedSession {
            session: AuthSession::from_row(&session, fresh),
            user,
        })
    }

    pub async fn invalidate_session(&self, session_id: &str) -> AuthResult<()> {
        self.session_repo.delete(session_id).await?;
        Ok(())
    }

    /// Revoke every session of a user (e.g. after an email change).
    pub async fn invalidate_user_sessions(&self, user_id: Uuid) -> AuthResult<()> {
        self.session_repo.delete_by_user(user_id).await?;
        info!(%user_id, "user sessions invalidated");
        Ok(())
    }

    /// Active sessions of a user.
    pub async fn user_sessions(&self, user_id: Uuid) -> AuthResult<Vec<AuthSession>> {
        let now = Utc::now();
        let sessions = self.session_repo.list_by_user(user_id).await?;
        Ok(sessions
            .iter()
            .filter(|s| s.is_active_at(now))
            .map(|s| AuthSession::from_row(s, false))
            .collect())
    }

    /// Remove all expired sessions. Returns how many were removed.
    pub async fn delete_expired_sessions(&self) -> AuthResult<u64> {
        let removed = self.session_repo.delete_expired(Utc::now()).await?;
        info!(removed, "expired sessions purged");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Cookies
    // -----------------------------------------------------------------------

    fn cookie_attributes(&self, max_age: Option<u64>) -> CookieAttributes {
        CookieAttributes {
            http_only: true,
            secure: self.config.secure_cookies,
            same_site: self.config.same_site,
            path: self.config.cookie_path.clone(),
            domain: self.config.cookie_domain.clone(),
            max_age,
        }
    }

    pub fn create_session_cookie(&self, session_id: &str) -> Cookie {
        let max_age = self
            .config
            .cookie_expires
            .then_some(self.config.session_lifetime_secs);
        Cookie {
            name: self.config.cookie_name.clone(),
            value: session_id.to_string(),
            attributes: self.cookie_attributes(max_age),
        }
    }

    /// Cookie that clears the session cookie in the browser.
    pub fn create_blank_session_cookie(&self) -> Cookie {
        Cookie {
            name: self.config.cookie_name.clone(),
            value: String::new(),
            attributes: self.cookie_attributes(Some(0)),
        }
    }

    /// Session id carried by a `Cookie` request header.
    pub fn read_session_cookie<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie::read_session_cookie(cookie_header, &self.config.cookie_name)
    }

    /// Session id carried by an `Authorization` request header.
    pub fn read_bearer_token<'a>(&self, authorization_header: &'a str) -> Option<&'a str> {
        cookie::read_bearer_token(authorization_header)
    }
}
