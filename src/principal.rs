//! Authenticated user identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Authority prefix for raw group memberships.
const GROUP_PREFIX: &str = "GROUP_";

/// Identity of an authenticated user.
///
/// Built once by the authentication engine at login time and treated as
/// immutable afterwards; re-authentication produces a fresh value. Sets are
/// ordered so serialized snapshots are deterministic and round-trip exactly
/// through the SSO store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: i64,
    login_name: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    middle_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    groups: BTreeSet<String>,
    #[serde(default)]
    roles: BTreeSet<String>,
    enabled: bool,
}

impl Principal {
    #[must_use]
    pub fn new(user_id: i64, login_name: impl Into<String>) -> Self {
        Self {
            user_id,
            login_name: login_name.into(),
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            groups: BTreeSet::new(),
            roles: BTreeSet::new(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_names(
        mut self,
        first: impl Into<String>,
        middle: impl Into<String>,
        last: impl Into<String>,
    ) -> Self {
        self.first_name = first.into();
        self.middle_name = middle.into();
        self.last_name = last.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn with_groups(mut self, groups: BTreeSet<String>) -> Self {
        self.groups = groups;
        self
    }

    #[must_use]
    pub fn with_roles(mut self, roles: BTreeSet<String>) -> Self {
        self.roles = roles;
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    #[must_use]
    pub fn login_name(&self) -> &str {
        &self.login_name
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn middle_name(&self) -> &str {
        &self.middle_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Full display name, skipping empty name parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Raw group memberships as `GROUP_`-prefixed authority tokens.
    #[must_use]
    pub fn group_authorities(&self) -> BTreeSet<String> {
        self.groups
            .iter()
            .map(|group| format!("{GROUP_PREFIX}{group}"))
            .collect()
    }
}
