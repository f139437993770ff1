//! Password hashing with two incompatible historical schemes.
//!
//! All new hashes use the adaptive scheme; the legacy iterated digest is
//! kept only so credentials stored before the migration keep verifying.
//! The scheme tag is embedded in the stored credential, so verification
//! dispatches without the caller knowing which hasher produced it.

mod adaptive;
mod legacy;

pub use adaptive::AdaptiveHasher;
pub use legacy::LegacyDigestHasher;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::HashError;

/// Version marker on the encoded legacy form.
const LEGACY_PREFIX: &str = "v1";

/// A salted password hash, tagged with the scheme that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashedCredential {
    /// Iterated-digest scheme with an explicit salt and derived key.
    Legacy { salt: Vec<u8>, key: Vec<u8> },
    /// Adaptive scheme; salt and cost are embedded in the encoded string.
    Adaptive { encoded: String },
}

impl HashedCredential {
    /// Stable string form for storage.
    ///
    /// Legacy credentials encode as `v1$<salt>$<key>` with base64 fields;
    /// adaptive credentials pass through their `$2…` encoding verbatim.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Legacy { salt, key } => {
                format!(
                    "{LEGACY_PREFIX}${}${}",
                    STANDARD.encode(salt),
                    STANDARD.encode(key)
                )
            }
            Self::Adaptive { encoded } => encoded.clone(),
        }
    }

    /// Parse a stored credential.
    ///
    /// Returns `None` for unrecognized input; callers treat that as a
    /// failed verification, never as a crash.
    #[must_use]
    pub fn parse(stored: &str) -> Option<Self> {
        if stored.starts_with("$2") {
            return Some(Self::Adaptive {
                encoded: stored.to_string(),
            });
        }

        let mut parts = stored.splitn(3, '$');
        if parts.next() != Some(LEGACY_PREFIX) {
            return None;
        }
        let salt = STANDARD.decode(parts.next()?).ok()?;
        let key = STANDARD.decode(parts.next()?).ok()?;
        if salt.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::Legacy { salt, key })
    }

    /// Verify `password` against this credential, dispatching on the
    /// scheme tag. Garbled credentials verify as `false`.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        match self {
            Self::Legacy { salt, key } => legacy::verify_with_salt(password, salt, key),
            Self::Adaptive { encoded } => bcrypt::verify(password, encoded).unwrap_or(false),
        }
    }
}

/// Hash and verify passwords for one scheme.
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a freshly generated random salt.
    ///
    /// # Errors
    /// Fails only on entropy-source or encoding problems, which indicate a
    /// broken environment rather than bad input.
    fn hash(&self, password: &str) -> Result<HashedCredential, HashError>;

    /// Re-derive using the credential's stored salt and scheme and compare
    /// in constant time. Never errors: mismatched or malformed credentials
    /// are `false`.
    fn verify(&self, password: &str, credential: &HashedCredential) -> bool {
        credential.verify(password)
    }
}

#[cfg(test)]
mod tests {
    use super::{AdaptiveHasher, HashedCredential, LegacyDigestHasher, PasswordHasher};

    #[test]
    fn encoded_legacy_credential_round_trips() {
        let hasher = LegacyDigestHasher::default();
        let credential = hasher.hash("open sesame").expect("hash");
        let parsed = HashedCredential::parse(&credential.encode()).expect("parse");
        assert_eq!(parsed, credential);
        assert!(parsed.verify("open sesame"));
    }

    #[test]
    fn unrecognized_credentials_do_not_parse() {
        assert!(HashedCredential::parse("").is_none());
        assert!(HashedCredential::parse("v2$AAAA$BBBB").is_none());
        assert!(HashedCredential::parse("v1$not-base64!$AAAA").is_none());
        assert!(HashedCredential::parse("plaintext").is_none());
    }

    #[test]
    fn legacy_credentials_verify_after_switching_to_adaptive() {
        // Migration property: credentials hashed under the old scheme keep
        // verifying once the adaptive hasher is the default.
        let stored = LegacyDigestHasher::default()
            .hash("pa55word")
            .expect("hash")
            .encode();

        let current = AdaptiveHasher::with_cost(4).expect("hasher");
        let credential = HashedCredential::parse(&stored).expect("parse");
        assert!(current.verify("pa55word", &credential));
        assert!(!current.verify("password", &credential));
    }

    #[test]
    fn garbled_adaptive_credential_verifies_false() {
        let credential = HashedCredential::Adaptive {
            encoded: "$2b$zz$garbage".to_string(),
        };
        assert!(!credential.verify("anything"));
    }
}
