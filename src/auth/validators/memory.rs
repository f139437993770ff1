//! Fixed-list credential source, loadable from a JSON users file.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

use super::CredentialValidator;
use crate::hash::HashedCredential;
use crate::principal::Principal;
use crate::scope::HostScope;

/// One configured user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub user_id: i64,
    pub login_name: String,
    /// Stored credential in its encoded form, either scheme.
    pub credential: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct UsersDocument {
    users: Vec<UserEntry>,
}

/// Credential source over a fixed in-memory user list.
///
/// Useful for small deployments and tests; the list never changes after
/// construction.
pub struct MemoryCredentialValidator {
    users: Vec<UserEntry>,
}

impl MemoryCredentialValidator {
    #[must_use]
    pub fn new(users: Vec<UserEntry>) -> Self {
        Self { users }
    }

    /// Load users from a JSON document of the form `{"users": [...]}`.
    ///
    /// # Errors
    /// Fails when the file cannot be read, does not parse, or contains a
    /// malformed login name. Users files are wiring-time configuration, so
    /// this is fatal at startup.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read users from {}", path.display()))?;
        let document: UsersDocument =
            serde_json::from_str(&raw).context("invalid users document")?;

        let login_format =
            Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").context("invalid login name pattern")?;
        for user in &document.users {
            if !login_format.is_match(&user.login_name) {
                bail!("invalid login name in users file: {:?}", user.login_name);
            }
        }

        Ok(Self::new(document.users))
    }
}

#[async_trait]
impl CredentialValidator for MemoryCredentialValidator {
    async fn validate(
        &self,
        username: &str,
        password: &SecretString,
        _scope: &HostScope,
    ) -> Option<Principal> {
        let user = self
            .users
            .iter()
            .find(|user| user.login_name.eq_ignore_ascii_case(username))?;
        if !user.enabled {
            return None;
        }

        let Some(credential) = HashedCredential::parse(&user.credential) else {
            warn!("unparseable stored credential for {}", user.login_name);
            return None;
        };
        if !credential.verify(password.expose_secret()) {
            return None;
        }

        Some(
            Principal::new(user.user_id, &user.login_name)
                .with_names(&user.first_name, &user.middle_name, &user.last_name)
                .with_email(&user.email)
                .with_groups(user.groups.clone())
                .with_enabled(user.enabled),
        )
    }
}
