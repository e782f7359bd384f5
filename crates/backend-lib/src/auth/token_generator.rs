// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
//! Secure random identifiers for sealed sessions.
//!
//! Every sealed cookie carries one so that a destroyed session can be
//! recognised if its bytes are replayed.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

/// Default id size in bytes (16 bytes = 128 bits of entropy)
const DEFAULT_ID_BYTES: usize = 16;

/** Generate a random session id
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_session_id() -> String {
    generate_token_with_size(DEFAULT_ID_BYTES)
}

fn generate_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}
