//! Password hashing for stored credentials
//!
//! Passwords are never stored in the clear; records hold a salted
//! PBKDF2-HMAC-SHA256 hash. Verification keeps exact-match semantics: it
//! succeeds only when the presented password derives the stored hash.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const DEFAULT_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

/// A salted password hash, stored alongside the user record.
///
/// `salt` and `hash` are base64-encoded. `iterations` is persisted so that
/// records written under an older cost parameter keep verifying.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl PasswordHash {
    /// Derive a hash from a password with a fresh random salt
    pub fn derive(password: &str) -> Self {
        Self::derive_with_iterations(password, DEFAULT_ITERATIONS)
    }

    /// Derive a hash with an explicit iteration count
    pub fn derive_with_iterations(password: &str, iterations: u32) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let key = derive_key(password, &salt, iterations.max(1));

        Self {
            salt: B64.encode(salt),
            hash: B64.encode(key),
            iterations: iterations.max(1),
        }
    }

    /// Check a presented password against this hash
    ///
    /// Returns `false` for any mismatch, including undecodable stored salt.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(salt) = B64.decode(&self.salt) else {
            return false;
        };
        let key = derive_key(password, &salt, self.iterations.max(1));
        B64.encode(key) == self.hash
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}
