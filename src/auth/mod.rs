//! Session-cookie authentication: registration, login, and the request
//! extractor that threads the authenticated user into every store call.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;

use sha2::{Digest, Sha256};

pub use middleware::AuthContext;

pub const SESSION_COOKIE_NAME: &str = "ap_session";

/// Generate a new session token (sent to the client; only its digest is
/// stored server-side).
pub fn generate_session_token() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..32)
        .map(|_| {
            let idx = rng.random_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}

/// Digest stored in the sessions table in place of the raw token.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
