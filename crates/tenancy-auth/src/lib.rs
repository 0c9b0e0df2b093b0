//! Tenancy Auth: session cookies bound to the `session` and `users`
//! tables, with the owning tenant exposed on every validated session.

pub mod config;
pub mod cookie;
pub mod error;
pub mod service;
pub mod token;

pub use config::{AuthConfig, RuntimeMode};
pub use cookie::{Cookie, CookieAttributes, SameSite};
pub use error::{AuthError, AuthResult};
pub use service::{
    AuthSession, SessionAttributes, SessionService, ValidatedSession, session_attributes,
};
