//! API key and session token generation.
//!
//! Both are OS-sourced random bytes, hex-encoded. Tokens are never
//! derived from user data; the store's UNIQUE indexes remain the
//! authoritative collision guard, though at 192 and 256 bits of
//! entropy a retry path is unnecessary in practice.

use rand::RngCore;
use rand::rngs::OsRng;

/// Prefix marking project API keys, useful for secret scanning.
pub const API_KEY_PREFIX: &str = "ea_";

fn random_hex(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a new project API key (`ea_` + 24 random bytes, hex).
pub fn generate_api_key() -> String {
    format!("{API_KEY_PREFIX}{}", random_hex(24))
}

/// Generate a new opaque session token (32 random bytes, hex).
pub fn generate_session_token() -> String {
    random_hex(32)
}
