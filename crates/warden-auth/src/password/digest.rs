//! One-way salted digests of secrets and their verification.
//!
//! The stored form of a secret is two concatenated SHA-256 hex digests:
//!
//! ```text
//! base_hash   = hex(sha256(secret))
//! stored_hash = base_hash || hex(sha256(base_hash || salt))
//! ```
//!
//! together with `hex(salt)`. The second digest is taken over the
//! already-hashed secret, so re-verification never needs the original
//! secret beyond the candidate being checked. The construction is kept
//! bit-for-bit so existing stored credentials keep verifying.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use warden_entity::identity::SaltedVerifier;

/// Length in hex characters of one SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Pure hashing and verification of secrets. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEngine;

impl HashEngine {
    /// Creates a new hash engine.
    pub fn new() -> Self {
        Self
    }

    /// Returns the lowercase hex SHA-256 digest of `text`'s UTF-8 bytes.
    pub fn digest(&self, text: &str) -> String {
        self.digest_bytes(text.as_bytes())
    }

    /// Builds the verifier for an already computed `base_hash` and a raw salt.
    pub fn salted_verifier(&self, base_hash: &str, salt: &str) -> SaltedVerifier {
        self.verifier_from_salt_bytes(base_hash, salt.as_bytes())
    }

    /// Checks `candidate` against a stored verifier.
    ///
    /// A salt that is not valid hex is reported as a plain mismatch.
    /// The final comparison runs in constant time.
    pub fn verify(&self, candidate: &str, salt_encoded: &str, stored_hash: &str) -> bool {
        let Ok(salt) = hex::decode(salt_encoded) else {
            return false;
        };
        let recomputed = self.verifier_from_salt_bytes(&self.digest(candidate), &salt);
        constant_time_eq(recomputed.stored_hash.as_bytes(), stored_hash.as_bytes())
    }

    /// Convenience wrapper over [`HashEngine::verify`] for a whole verifier.
    pub fn verify_against(&self, candidate: &str, verifier: &SaltedVerifier) -> bool {
        self.verify(candidate, &verifier.salt_encoded, &verifier.stored_hash)
    }

    fn digest_bytes(&self, bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    fn verifier_from_salt_bytes(&self, base_hash: &str, salt: &[u8]) -> SaltedVerifier {
        let mut hasher = Sha256::new();
        hasher.update(base_hash.as_bytes());
        hasher.update(salt);
        let combined_hash = hex::encode(hasher.finalize());

        SaltedVerifier {
            salt_encoded: hex::encode(salt),
            stored_hash: format!("{base_hash}{combined_hash}"),
        }
    }
}

/// Generates a fresh per-identity salt: a random UUID in simple (32 hex char) form.
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Decodes a hex-encoded salt back to its raw string, if it is valid hex and UTF-8.
pub fn decode_salt(salt_encoded: &str) -> Option<String> {
    hex::decode(salt_encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Constant-time byte comparison. Length mismatches compare unequal.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD_HASH: &str = "e7cf3ef4f17c3999a94f2c6f612e8a888e5b1026878e4e19398b23bd38ec221a";
    const SALT: &str = "e3254be6fcc8492185d92843c5a3b2ba";
    const SALT_ENCODED: &str = "6533323534626536666363383439323138356439323834336335613362326261";
    const COMBINED_HASH: &str = "59d752f4ef5016f035b5b4dc7ef9971ecb29f6407045d3df401722bfd563ac1b";

    #[test]
    fn test_digest_known_value() {
        let engine = HashEngine::new();
        let digest = engine.digest("Password");
        assert_eq!(digest, PASSWORD_HASH);
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_digest_is_deterministic() {
        let engine = HashEngine::new();
        assert_eq!(engine.digest("same input"), engine.digest("same input"));
    }

    #[test]
    fn test_digest_avalanche() {
        let engine = HashEngine::new();
        let inputs = ["a", "b", "secret", "hunter2", "Password1"];
        let total: usize = inputs
            .iter()
            .map(|s| {
                let a = engine.digest(s);
                let b = engine.digest(&format!("{s}!"));
                a.chars().zip(b.chars()).filter(|(x, y)| x != y).count()
            })
            .sum();
        // Random hex digits differ 15/16 of the time: ~60 of 64 per pair.
        assert!(total / inputs.len() > 48, "average differing digits too low: {total}");
    }

    #[test]
    fn test_salted_verifier_known_value() {
        let engine = HashEngine::new();
        let verifier = engine.salted_verifier(PASSWORD_HASH, SALT);
        assert_eq!(verifier.salt_encoded, SALT_ENCODED);
        assert_eq!(verifier.stored_hash, format!("{PASSWORD_HASH}{COMBINED_HASH}"));
        assert_eq!(verifier.stored_hash.len(), 2 * DIGEST_HEX_LEN);
    }

    #[test]
    fn test_salt_round_trip() {
        for salt in [SALT, "", "salt with spaces", "ünïcödé"] {
            let encoded = HashEngine::new().salted_verifier(PASSWORD_HASH, salt).salt_encoded;
            assert_eq!(decode_salt(&encoded).as_deref(), Some(salt));
        }
    }

    #[test]
    fn test_verify_matches_only_original_secret() {
        let engine = HashEngine::new();
        let verifier = engine.salted_verifier(&engine.digest("Password"), SALT);
        assert!(engine.verify("Password", &verifier.salt_encoded, &verifier.stored_hash));
        assert!(!engine.verify("password", &verifier.salt_encoded, &verifier.stored_hash));
        assert!(!engine.verify("Password ", &verifier.salt_encoded, &verifier.stored_hash));
        assert!(!engine.verify("", &verifier.salt_encoded, &verifier.stored_hash));
    }

    #[test]
    fn test_verify_rejects_corrupt_salt() {
        let engine = HashEngine::new();
        let verifier = engine.salted_verifier(&engine.digest("Password"), SALT);
        assert!(!engine.verify("Password", "not-hex!", &verifier.stored_hash));
        assert!(!engine.verify("Password", "abc", &verifier.stored_hash));
    }

    #[test]
    fn test_verify_rejects_truncated_hash() {
        let engine = HashEngine::new();
        let verifier = engine.salted_verifier(&engine.digest("Password"), SALT);
        let truncated = &verifier.stored_hash[..DIGEST_HEX_LEN];
        assert!(!engine.verify("Password", &verifier.salt_encoded, truncated));
    }

    #[test]
    fn test_different_salts_produce_different_hashes() {
        let engine = HashEngine::new();
        let base = engine.digest("Password");
        let a = engine.salted_verifier(&base, &generate_salt());
        let b = engine.salted_verifier(&base, &generate_salt());
        assert_ne!(a.stored_hash, b.stored_hash);
        assert_eq!(a.stored_hash[..DIGEST_HEX_LEN], b.stored_hash[..DIGEST_HEX_LEN]);
    }

    #[test]
    fn test_generate_salt_shape() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
