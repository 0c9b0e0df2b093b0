//! PostgreSQL repository implementations.

mod session;
mod subscription;
mod tenant;
mod user;

pub use session::PgSessionRepository;
pub use subscription::PgSubscriptionRepository;
pub use tenant::PgTenantRepository;
pub use user::PgUserRepository;
