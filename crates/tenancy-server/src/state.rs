//! Shared application state handed to request handlers.

use std::sync::Arc;

use tenancy_auth::SessionService;
use tenancy_db::PgPool;
use tenancy_db::repository::{PgSessionRepository, PgUserRepository};

use crate::config::ServerConfig;

pub type PgSessionService = SessionService<PgUserRepository, PgSessionRepository>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<PgSessionService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &ServerConfig) -> Self {
        let sessions = SessionService::new(
            PgUserRepository::new(pool.clone()),
            PgSessionRepository::new(pool),
            config.auth(),
        );

        Self {
            sessions: Arc::new(sessions),
        }
    }
}
