//! Error taxonomy shared across the crate.
//!
//! Expected outcomes (wrong password, missing cookie, unmapped scope) are
//! modeled as `Option`/empty values at the call sites, not as errors. The
//! types here cover violated invariants and unrecoverable conditions.

use thiserror::Error;

/// Login attempt failures surfaced to callers.
///
/// Unknown users and wrong passwords collapse into `BadCredentials` so a
/// caller cannot use the response to enumerate accounts.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("bad credentials")]
    BadCredentials,
}

/// SSO storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Tokens are write-once. A collision means the entropy source is
    /// suspect, so the operation must not be retried with the same token.
    #[error("token already stored: {0}")]
    DuplicateToken(String),

    /// File-backed store read/write failure. Recoverable: the caller
    /// decides whether to treat the session as absent.
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),

    /// A stored snapshot no longer decodes.
    #[error("corrupt stored principal: {0}")]
    Corrupt(String),
}

/// The per-request host scope was read before the request pipeline
/// established it. Indicates a missing layer in the router wiring.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("host scope not established for this request")]
    NotEstablished,
}

/// Password hashing failures.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("password cannot be encoded")]
    Encoding,
    #[error("invalid work factor: {0}")]
    Cost(u32),
    #[error("invalid salt length: {0}")]
    SaltLength(usize),
    #[error("entropy source failure")]
    Rng,
}
