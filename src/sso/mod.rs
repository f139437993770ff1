//! Shared SSO token store and the per-request filter state machines.

mod file;
pub mod filters;
mod memory;

pub use file::FileSsoStorage;
pub use memory::SharedMapSsoStorage;

use uuid::Uuid;

use crate::auth::Authentication;
use crate::error::StoreError;
use crate::principal::Principal;

/// Mint a fresh opaque SSO token.
///
/// UUID v4 in canonical form: 122 random bits, never reused.
#[must_use]
pub fn mint_token() -> String {
    Uuid::new_v4().to_string()
}

/// Store mapping opaque SSO tokens to principal snapshots, shared by every
/// application participating in the SSO domain.
///
/// A token present in the store always denotes an authenticated principal:
/// `store` silently ignores unauthenticated attempts.
pub trait SsoStorage: Send + Sync {
    /// Look up the principal for `token`. Unknown tokens are `None`, not an
    /// error; a stale or foreign cookie is an expected condition.
    fn find(&self, token: &str) -> Result<Option<Principal>, StoreError>;

    /// Persist the authenticated principal under `token`.
    ///
    /// Tokens are write-once: storing an already-mapped token fails with
    /// [`StoreError::DuplicateToken`]. Re-issuing requires a new token.
    /// Storing an unauthenticated `auth` is a no-op.
    fn store(&self, token: &str, auth: &Authentication) -> Result<(), StoreError>;

    /// Remove `token`. Idempotent: removing an absent token succeeds.
    fn remove(&self, token: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::mint_token;

    #[test]
    fn tokens_are_canonical_uuids() {
        let token = mint_token();
        assert_eq!(token.len(), 36);
        assert!(uuid::Uuid::parse_str(&token).is_ok());
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(mint_token(), mint_token());
    }
}
