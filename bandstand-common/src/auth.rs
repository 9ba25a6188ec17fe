//! Credential hashing
//!
//! Passwords are never stored in the clear. Each user gets a random
//! per-user salt; the stored hash is SHA-256 over salt ‖ password, hex
//! encoded. Pure functions only — no database or HTTP dependencies.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random salt bytes per user (stored hex encoded, 32 chars)
const SALT_BYTES: usize = 16;

/// Generate a fresh random salt, hex encoded
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// Returns SHA-256(salt ‖ password) as 64 hex characters.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password attempt against the stored salt and hash
///
/// Comparison does not short-circuit on the first mismatched byte.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let calculated = hash_password(password, salt);

    if calculated.len() != stored_hash.len() {
        return false;
    }

    calculated
        .bytes()
        .zip(stored_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_hex_and_random() {
        let a = generate_salt();
        let b = generate_salt();

        assert_eq!(a.len(), SALT_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hash1 = hash_password("hunter2", "00ff00ff");
        let hash2 = hash_password("hunter2", "00ff00ff");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salt_changes_hash() {
        let hash1 = hash_password("hunter2", "aaaa");
        let hash2 = hash_password("hunter2", "bbbb");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_accepts_correct_password() {
        let salt = generate_salt();
        let stored = hash_password("correct horse", &salt);
        assert!(verify_password("correct horse", &salt, &stored));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let salt = generate_salt();
        let stored = hash_password("correct horse", &salt);
        assert!(!verify_password("battery staple", &salt, &stored));
    }

    #[test]
    fn test_verify_rejects_empty_stored_hash() {
        assert!(!verify_password("anything", "salt", ""));
    }
}
