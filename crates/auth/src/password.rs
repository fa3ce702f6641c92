//! Password Hashing
//!
//! PBKDF2-HMAC-SHA256 with a random per-password salt, stored as
//! `hex(salt)$hex(key)`.

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> String {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).expect("system rng unavailable");

    let mut key = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(ITERATIONS).unwrap(),
        &salt,
        password.as_bytes(),
        &mut key,
    );

    format!("{}${}", hex::encode(salt), hex::encode(key))
}

/// Verify a password against a stored hash. Comparison is constant-time;
/// malformed hashes simply fail verification.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, key_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(key)) = (hex::decode(salt_hex), hex::decode(key_hex)) else {
        return false;
    };

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(ITERATIONS).unwrap(),
        &salt,
        password.as_bytes(),
        &key,
    )
    .is_ok()
}
