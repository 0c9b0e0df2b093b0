//! Opaque session identifiers.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Random bytes behind every session id.
pub const SESSION_ID_BYTES: usize = 32;

/// Generate a cryptographically random session id
/// (32 bytes, base64url-encoded without padding).
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; SESSION_ID_BYTES] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}
