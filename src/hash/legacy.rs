//! Iterated SHA-1 scheme, kept for verifying credentials stored before the
//! adaptive-hash migration.

use rand::{rngs::OsRng, RngCore};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use super::{HashedCredential, PasswordHasher};
use crate::error::HashError;

/// Extra digest rounds applied after the initial salted digest. Fixed by
/// the on-disk population of old credentials.
const ITERATION_COUNT: usize = 1000;

/// Default salt length in bytes.
const DEFAULT_SALT_LENGTH: usize = 8;

/// Salted iterated-digest hasher.
///
/// Weak by modern standards (fast hash, no memory cost). New hashes should
/// come from [`AdaptiveHasher`](super::AdaptiveHasher); this scheme exists
/// so previously stored credentials keep verifying.
#[derive(Debug, Clone)]
pub struct LegacyDigestHasher {
    salt_length: usize,
}

impl Default for LegacyDigestHasher {
    fn default() -> Self {
        Self {
            salt_length: DEFAULT_SALT_LENGTH,
        }
    }
}

impl LegacyDigestHasher {
    /// Hasher generating salts of `salt_length` bytes.
    ///
    /// # Errors
    /// Rejects a zero-length salt.
    pub fn with_salt_length(salt_length: usize) -> Result<Self, HashError> {
        if salt_length < 1 {
            return Err(HashError::SaltLength(salt_length));
        }
        Ok(Self { salt_length })
    }
}

impl PasswordHasher for LegacyDigestHasher {
    fn hash(&self, password: &str) -> Result<HashedCredential, HashError> {
        let mut salt = vec![0u8; self.salt_length];
        OsRng.try_fill_bytes(&mut salt).map_err(|_| HashError::Rng)?;
        let key = derive(password, &salt);
        Ok(HashedCredential::Legacy { salt, key })
    }
}

/// `SHA1(salt || password)`, then the digest applied to its own output for
/// the fixed iteration count.
fn derive(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut digest = Sha1::new();
    digest.update(salt);
    digest.update(password.as_bytes());
    let mut key = digest.finalize_reset().to_vec();
    for _ in 0..ITERATION_COUNT {
        digest.update(&key);
        key = digest.finalize_reset().to_vec();
    }
    key
}

pub(super) fn verify_with_salt(password: &str, salt: &[u8], key: &[u8]) -> bool {
    let candidate = derive(password, salt);
    candidate.ct_eq(key).into()
}

#[cfg(test)]
mod tests {
    use super::{derive, LegacyDigestHasher, DEFAULT_SALT_LENGTH};
    use crate::error::HashError;
    use crate::hash::{HashedCredential, PasswordHasher};

    #[test]
    fn hash_then_verify_succeeds() {
        let hasher = LegacyDigestHasher::default();
        let credential = hasher.hash("correct horse").expect("hash");
        assert!(hasher.verify("correct horse", &credential));
    }

    #[test]
    fn wrong_password_fails() {
        let hasher = LegacyDigestHasher::default();
        let credential = hasher.hash("correct horse").expect("hash");
        assert!(!hasher.verify("battery staple", &credential));
    }

    #[test]
    fn salts_are_not_reused() {
        let hasher = LegacyDigestHasher::default();
        let first = hasher.hash("same password").expect("hash");
        let second = hasher.hash("same password").expect("hash");

        let (HashedCredential::Legacy { salt: s1, key: k1 }, HashedCredential::Legacy { salt: s2, key: k2 }) =
            (&first, &second)
        else {
            panic!("legacy hasher produced a non-legacy credential");
        };
        assert_ne!(s1, s2);
        assert_ne!(k1, k2);
        assert_ne!(first.encode(), second.encode());
    }

    #[test]
    fn default_salt_is_eight_bytes() {
        let credential = LegacyDigestHasher::default().hash("pw").expect("hash");
        let HashedCredential::Legacy { salt, .. } = credential else {
            panic!("expected a legacy credential");
        };
        assert_eq!(salt.len(), DEFAULT_SALT_LENGTH);
    }

    #[test]
    fn salt_length_is_configurable() {
        let hasher = LegacyDigestHasher::with_salt_length(16).expect("hasher");
        let HashedCredential::Legacy { salt, .. } = hasher.hash("pw").expect("hash") else {
            panic!("expected a legacy credential");
        };
        assert_eq!(salt.len(), 16);
    }

    #[test]
    fn zero_salt_length_is_rejected() {
        assert!(matches!(
            LegacyDigestHasher::with_salt_length(0),
            Err(HashError::SaltLength(0))
        ));
    }

    #[test]
    fn derivation_is_deterministic_for_fixed_salt() {
        let salt = [1u8, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(derive("pw", &salt), derive("pw", &salt));
        assert_ne!(derive("pw", &salt), derive("pw2", &salt));
    }
}
