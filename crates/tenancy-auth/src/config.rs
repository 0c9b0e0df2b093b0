//! Session authentication configuration.

use std::fmt;
use std::str::FromStr;

use crate::cookie::SameSite;

/// Deployment mode. Development serves plain HTTP, so session cookies
/// drop the `Secure` attribute there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    Development,
    #[default]
    Production,
}

impl RuntimeMode {
    pub fn is_development(&self) -> bool {
        matches!(self, RuntimeMode::Development)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Development => write!(f, "development"),
            RuntimeMode::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown runtime mode '{0}', expected 'development' or 'production'")]
pub struct UnknownRuntimeMode(pub String);

impl FromStr for RuntimeMode {
    type Err = UnknownRuntimeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeMode::Development),
            "production" | "prod" => Ok(RuntimeMode::Production),
            other => Err(UnknownRuntimeMode(other.to_string())),
        }
    }
}

/// Configuration for the session service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in seconds (default: 2_592_000 = 30 days).
    pub session_lifetime_secs: u64,
    /// Name of the session cookie (default: `auth_session`).
    pub cookie_name: String,
    /// When `false` the cookie is a browser-session cookie without
    /// `Max-Age`.
    pub cookie_expires: bool,
    /// Emit the `Secure` attribute.
    pub secure_cookies: bool,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub same_site: SameSite,
}

impl AuthConfig {
    /// Defaults with the `Secure` flag chosen by `mode`.
    pub fn for_mode(mode: RuntimeMode) -> Self {
        Self {
            secure_cookies: !mode.is_development(),
            ..Self::default()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 2_592_000,
            cookie_name: "auth_session".into(),
            cookie_expires: true,
            secure_cookies: true,
            cookie_path: "/".into(),
            cookie_domain: None,
            same_site: SameSite::Lax,
        }
    }
}
