//! # Ensaluto (SSO & Host-Scoped Authorization)
//!
//! `ensaluto` authenticates users against pluggable credential sources,
//! computes their effective roles for the requesting virtual host, and keeps
//! cross-application single sign-on state in a shared token store, so a
//! login on one web application is recognized by sibling applications
//! sharing a cookie domain.
//!
//! ## Host scoping
//!
//! Role mappings are keyed by a normalized `(host, context path)` pair.
//! `localhost` and IP-address literals collapse to a wildcard host, so
//! development traffic resolves against the same mapping regardless of how
//! the machine is addressed. Roles are recomputed from the mapping on every
//! request; changing a mapping takes effect without a re-login.
//!
//! ## Password schemes
//!
//! Stored credentials are tagged with the scheme that produced them. New
//! hashes always use the adaptive scheme (work factor 14); the legacy
//! iterated digest is kept only so credentials from before the migration
//! keep verifying.
//!
//! ## SSO lifecycle
//!
//! A successful login mints an opaque token, persists the principal
//! snapshot under it, and hands the token to the client as a cookie with
//! path `/`. Every request first tries to pre-authenticate from that
//! cookie, and every locally authenticated request is re-validated against
//! the shared store, so a logout in a sibling application takes effect here
//! on the next request.

pub mod api;
pub mod auth;
pub mod cli;
pub mod error;
pub mod hash;
pub mod principal;
pub mod roles;
pub mod scope;
pub mod sso;
