//! Static role mapping, built in code or loaded from a JSON document.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use super::RoleResolver;
use crate::scope::HostScope;

/// Role table per host scope: role name to the set of groups holding it.
///
/// Read-only once built. A configuration reload constructs a fresh resolver
/// and swaps the owning `Arc`, so requests in flight keep reading the table
/// they started with.
#[derive(Debug, Default, Clone)]
pub struct StaticRoleResolver {
    mappings: HashMap<HostScope, HashMap<String, BTreeSet<String>>>,
}

#[derive(Debug, Deserialize)]
struct MappingDocument {
    mappings: Vec<MappingEntry>,
}

#[derive(Debug, Deserialize)]
struct MappingEntry {
    /// Omitted host means the wildcard scope.
    host: Option<String>,
    context: String,
    roles: HashMap<String, BTreeSet<String>>,
}

impl StaticRoleResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add groups to `role` under `scope`.
    #[must_use]
    pub fn with_role<I, S>(mut self, scope: HostScope, role: &str, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mappings
            .entry(scope)
            .or_default()
            .entry(role.to_string())
            .or_default()
            .extend(groups.into_iter().map(Into::into));
        self
    }

    /// Load mappings from a JSON document of the form
    /// `{"mappings": [{"host": …, "context": …, "roles": {"NAME": [groups…]}}]}`.
    ///
    /// # Errors
    /// Fails when the file cannot be read or does not parse; role mappings
    /// are wiring-time configuration, so this is fatal at startup.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read role mappings from {}", path.display()))?;
        let document: MappingDocument =
            serde_json::from_str(&raw).context("invalid role mapping document")?;

        let mut resolver = Self::new();
        for entry in document.mappings {
            let scope = match entry.host {
                Some(host) => HostScope::new(&host, &entry.context),
                None => HostScope::wildcard(&entry.context),
            };
            let table = resolver.mappings.entry(scope).or_default();
            for (role, groups) in entry.roles {
                table.entry(role).or_default().extend(groups);
            }
        }
        Ok(resolver)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl RoleResolver for StaticRoleResolver {
    fn roles(&self, scope: &HostScope, groups: &BTreeSet<String>) -> BTreeSet<String> {
        if groups.is_empty() {
            return BTreeSet::new();
        }
        let Some(table) = self.mappings.get(scope) else {
            return BTreeSet::new();
        };
        table
            .iter()
            .filter(|(_, role_groups)| role_groups.iter().any(|group| groups.contains(group)))
            .map(|(role, _)| role.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::StaticRoleResolver;
    use crate::roles::RoleResolver;
    use crate::scope::HostScope;
    use std::collections::BTreeSet;
    use std::io::Write;

    fn groups(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn fred_bob_resolver() -> StaticRoleResolver {
        StaticRoleResolver::new()
            .with_role(HostScope::new("fred", "/bob"), "ROLE2", ["A", "B"])
            .with_role(HostScope::new("fred", "/bob"), "ROLE3", ["C"])
    }

    #[test]
    fn overlapping_groups_grant_the_role() {
        let resolver = fred_bob_resolver();
        let roles = resolver.roles(&HostScope::new("fred", "/bob"), &groups(&["A", "B"]));
        assert_eq!(roles, groups(&["ROLE2"]));
    }

    #[test]
    fn any_single_group_is_enough() {
        let resolver = fred_bob_resolver();
        let roles = resolver.roles(&HostScope::new("fred", "/bob"), &groups(&["B", "C"]));
        assert_eq!(roles, groups(&["ROLE2", "ROLE3"]));
    }

    #[test]
    fn empty_groups_resolve_to_nothing() {
        let resolver = fred_bob_resolver();
        assert!(resolver
            .roles(&HostScope::new("fred", "/bob"), &BTreeSet::new())
            .is_empty());
    }

    #[test]
    fn unmapped_scope_resolves_to_nothing() {
        let resolver = fred_bob_resolver();
        assert!(resolver
            .roles(&HostScope::new("other", "/bob"), &groups(&["A"]))
            .is_empty());
    }

    #[test]
    fn resolution_is_pure() {
        let resolver = fred_bob_resolver();
        let scope = HostScope::new("fred", "/bob");
        let input = groups(&["A", "C"]);
        assert_eq!(resolver.roles(&scope, &input), resolver.roles(&scope, &input));
    }

    #[test]
    fn authorities_are_prefixed() {
        let resolver = fred_bob_resolver();
        let authorities = resolver.to_authorities(Some(&groups(&["ROLE2", "ROLE3"])));
        assert_eq!(authorities, Some(groups(&["ROLE_ROLE2", "ROLE_ROLE3"])));
    }

    #[test]
    fn authorities_keep_the_none_empty_distinction() {
        let resolver = fred_bob_resolver();
        assert_eq!(resolver.to_authorities(None), None);
        assert_eq!(
            resolver.to_authorities(Some(&BTreeSet::new())),
            Some(BTreeSet::new())
        );
    }

    #[test]
    fn loads_from_json_document() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"mappings": [
                {{"host": "fred", "context": "/bob", "roles": {{"ROLE2": ["A", "B"], "ROLE3": ["C"]}}}},
                {{"context": "/bob", "roles": {{"EVERYONE": ["*"]}}}}
            ]}}"#
        )
        .expect("write");

        let resolver = StaticRoleResolver::from_file(file.path()).expect("load");
        assert_eq!(
            resolver.roles(&HostScope::new("fred", "/bob"), &groups(&["A"])),
            groups(&["ROLE2"])
        );
        // The entry without a host binds the wildcard scope, which is what
        // localhost requests normalize to.
        assert_eq!(
            resolver.roles(&HostScope::new("localhost", "/bob"), &groups(&["*"])),
            groups(&["EVERYONE"])
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");
        assert!(StaticRoleResolver::from_file(file.path()).is_err());
    }
}
