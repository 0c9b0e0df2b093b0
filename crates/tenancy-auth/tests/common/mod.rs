//! In-memory repositories backing the session service in tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tenancy_core::error::{TenancyError, TenancyResult};
use tenancy_core::models::session::{CreateSession, Session};
use tenancy_core::models::user::{CreateUser, User};
use tenancy_core::repository::{SessionRepository, UserRepository};
use uuid::Uuid;

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Session>,
}

/// Handle to one in-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    store: Arc<Mutex<Store>>,
    remove_on_extend: Arc<AtomicBool>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository { db: self.clone() }
    }

    pub fn sessions(&self) -> MemorySessionRepository {
        MemorySessionRepository { db: self.clone() }
    }

    /// Insert a user directly, returning its id.
    pub fn add_user(&self, tenant_id: Uuid, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.store.lock().unwrap().users.insert(
            id,
            User {
                id,
                created_at: Some(Utc::now()),
                email: email.into(),
                verified: Some(false),
                tenant_id,
            },
        );
        id
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        self.store.lock().unwrap().sessions.get(id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.store.lock().unwrap().sessions.len()
    }

    /// Overwrite the expiry of a stored session.
    pub fn set_expiry(&self, id: &str, expires_at: DateTime<Utc>) {
        if let Some(session) = self.store.lock().unwrap().sessions.get_mut(id) {
            session.expires_at = expires_at;
        }
    }

    /// Make the next `update_expiration` find its row already deleted, as
    /// if another request logged the session out after it was read.
    pub fn remove_session_on_next_extend(&self) {
        self.remove_on_extend.store(true, Ordering::SeqCst);
    }

    /// Insert a session row directly, bypassing the service.
    pub fn add_session(&self, session: Session) {
        self.store
            .lock()
            .unwrap()
            .sessions
            .insert(session.id.clone(), session);
    }
}

pub struct MemoryUserRepository {
    db: MemoryDb,
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, input: CreateUser) -> TenancyResult<User> {
        let mut store = self.db.store.lock().unwrap();
        if store.users.values().any(|u| u.email == input.email) {
            return Err(TenancyError::UniqueViolation {
                constraint: "idx_users_email".into(),
            });
        }
        let user = User {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            created_at: Some(input.created_at.unwrap_or_else(Utc::now)),
            email: input.email,
            verified: Some(input.verified.unwrap_or(false)),
            tenant_id: input.tenant_id,
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> TenancyResult<User> {
        self.db
            .store
            .lock()
            .unwrap()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| TenancyError::not_found("user", id))
    }

    async fn get_by_email(&self, email: &str) -> TenancyResult<User> {
        self.db
            .store
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| TenancyError::not_found("user", email))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> TenancyResult<Vec<User>> {
        Ok(self
            .db
            .store
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> TenancyResult<()> {
        let mut store = self.db.store.lock().unwrap();
        store.sessions.retain(|_, s| s.user_id != id);
        store
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| TenancyError::not_found("user", id))
    }
}

pub struct MemorySessionRepository {
    db: MemoryDb,
}

impl SessionRepository for MemorySessionRepository {
    async fn create(&self, input: CreateSession) -> TenancyResult<Session> {
        let mut store = self.db.store.lock().unwrap();
        if !store.users.contains_key(&input.user_id) {
            return Err(TenancyError::ForeignKeyViolation {
                constraint: "session_user_id_users_id_fk".into(),
            });
        }
        let session = Session::from(input);
        store.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get_with_user(&self, id: &str) -> TenancyResult<(Session, User)> {
        let store = self.db.store.lock().unwrap();
        let session = store
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| TenancyError::not_found("session", id))?;
        let user = store
            .users
            .get(&session.user_id)
            .cloned()
            .ok_or_else(|| TenancyError::not_found("session", id))?;
        Ok((session, user))
    }

    async fn list_by_user(&self, user_id: Uuid) -> TenancyResult<Vec<Session>> {
        Ok(self
            .db
            .store
            .lock()
            .unwrap()
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_expiration(&self, id: &str, expires_at: DateTime<Utc>) -> TenancyResult<()> {
        let mut store = self.db.store.lock().unwrap();
        if self.db.remove_on_extend.swap(false, Ordering::SeqCst) {
            store.sessions.remove(id);
        }
        let session = store
            .sessions
            .get_mut(id)
            .ok_or_else(|| TenancyError::not_found("session", id))?;
        session.expires_at = expires_at;
        Ok(())
    }

    async fn delete(&self, id: &str) -> TenancyResult<()> {
        self.db.store.lock().unwrap().sessions.remove(id);
        Ok(())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> TenancyResult<()> {
        self.db
            .store
            .lock()
            .unwrap()
            .sessions
            .retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> TenancyResult<u64> {
        let mut store = self.db.store.lock().unwrap();
        let before = store.sessions.len();
        store.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - store.sessions.len()) as u64)
    }
}
