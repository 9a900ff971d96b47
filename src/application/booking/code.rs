//! Reservation code generation
//!
//! Codes are 8 uppercase hex characters drawn from the thread-local CSPRNG.
//! Uniqueness is enforced by the store (unique index); the lifecycle manager
//! retries with a fresh code on collision.

pub const CODE_LEN: usize = 8;

pub fn generate_code() -> String {
    let bytes: [u8; CODE_LEN / 2] = rand::random();
    hex::encode_upper(bytes)
}

/// Normalize a code typed by a customer.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
