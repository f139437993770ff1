//! Adaptive (bcrypt) scheme used for all new hashes.

use super::{HashedCredential, PasswordHasher};
use crate::error::HashError;

/// Work factor for new hashes.
const DEFAULT_COST: u32 = 14;

/// Adaptive salted hasher with a configurable work factor.
///
/// The salt is generated internally and embedded in the encoded credential,
/// so verification needs nothing beyond the stored string.
#[derive(Debug, Clone)]
pub struct AdaptiveHasher {
    cost: u32,
}

impl Default for AdaptiveHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl AdaptiveHasher {
    /// Hasher with an explicit work factor.
    ///
    /// # Errors
    /// Rejects costs outside the supported 4..=31 range.
    pub fn with_cost(cost: u32) -> Result<Self, HashError> {
        if !(4..=31).contains(&cost) {
            return Err(HashError::Cost(cost));
        }
        Ok(Self { cost })
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl PasswordHasher for AdaptiveHasher {
    fn hash(&self, password: &str) -> Result<HashedCredential, HashError> {
        let encoded = bcrypt::hash(password, self.cost).map_err(|_| HashError::Encoding)?;
        Ok(HashedCredential::Adaptive { encoded })
    }
}
