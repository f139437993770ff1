//! Host-scoped role resolution.

mod static_map;

pub use static_map::StaticRoleResolver;

use std::collections::BTreeSet;

use crate::scope::HostScope;

/// Authority prefix applied to resolved role names.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Resolves role names for a host scope from a user's group memberships.
pub trait RoleResolver: Send + Sync {
    /// Union of the roles whose configured groups overlap `groups`.
    ///
    /// A role is granted when any one of its configured groups is present.
    /// Empty when `groups` is empty or the scope has no mapping; both are
    /// expected conditions, not errors. Pure: identical inputs always give
    /// identical results.
    fn roles(&self, scope: &HostScope, groups: &BTreeSet<String>) -> BTreeSet<String>;

    /// Convert role names to `ROLE_`-prefixed authority tokens.
    ///
    /// `None` maps to `None` and an empty set maps to an empty set; callers
    /// distinguish the two.
    fn to_authorities(&self, roles: Option<&BTreeSet<String>>) -> Option<BTreeSet<String>> {
        roles.map(|roles| {
            roles
                .iter()
                .map(|role| format!("{ROLE_PREFIX}{role}"))
                .collect()
        })
    }
}
