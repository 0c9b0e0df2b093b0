//! Session cookie rendering and request header parsing.

use std::fmt;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes attached to a session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub domain: Option<String>,
    /// Seconds until the browser discards the cookie. `None` keeps it for
    /// the browser session.
    pub max_age: Option<u64>,
}

/// A cookie ready to be sent in a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub attributes: CookieAttributes,
}

impl Cookie {
    /// The `Set-Cookie` header value.
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        let attrs = &self.attributes;
        if let Some(max_age) = attrs.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if let Some(domain) = &attrs.domain {
            write!(f, "; Domain={domain}")?;
        }
        write!(f, "; Path={}", attrs.path)?;
        if attrs.http_only {
            write!(f, "; HttpOnly")?;
        }
        if attrs.secure {
            write!(f, "; Secure")?;
        }
        write!(f, "; SameSite={}", attrs.same_site.as_str())
    }
}

/// Extract the value of cookie `name` from a `Cookie` request header.
///
/// Empty values are treated as absent.
pub fn read_session_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn read_bearer_token(authorization_header: &str) -> Option<&str> {
    let (scheme, token) = authorization_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
