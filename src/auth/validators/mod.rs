//! Pluggable credential sources.
//!
//! Concrete sources are independent implementations selected by
//! configuration and composed behind one trait; there is no shared base to
//! inherit from.

mod memory;
mod postgres;

pub use memory::{MemoryCredentialValidator, UserEntry};
pub use postgres::PgCredentialValidator;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::principal::Principal;
use crate::scope::HostScope;

/// Validate a username/password pair against a credential source.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// `Some` with the user's principal when the credentials check out,
    /// `None` otherwise.
    ///
    /// Implementations must catch their own internal failures (a database
    /// outage, a malformed row) and report them as `None`. A validator
    /// never takes the request down with it.
    async fn validate(
        &self,
        username: &str,
        password: &SecretString,
        scope: &HostScope,
    ) -> Option<Principal>;
}
