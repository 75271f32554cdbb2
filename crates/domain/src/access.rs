use std::collections::BTreeSet;

use crate::{DirectGrant, PermissionName};

/// Effective permission set of one user after combining every source.
///
/// Callers must treat the set as unordered; iteration happens to be sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    bypass: bool,
    permissions: BTreeSet<PermissionName>,
}

impl EffectivePermissions {
    /// Returns the fail-closed empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the super-administrator set: the whole catalog.
    #[must_use]
    pub fn super_admin(catalog: &BTreeSet<PermissionName>) -> Self {
        Self {
            bypass: true,
            permissions: catalog.clone(),
        }
    }

    /// Rebuilds a set from a stored snapshot.
    #[must_use]
    pub fn from_parts(bypass: bool, permissions: BTreeSet<PermissionName>) -> Self {
        Self {
            bypass,
            permissions,
        }
    }

    /// Combines role-derived grants with explicit overrides.
    ///
    /// Explicit `granted=true` rows add, explicit `granted=false` rows remove
    /// even when a role grants the permission. Synced rows are ignored. The
    /// result never leaves the catalog.
    #[must_use]
    pub fn compute(
        catalog: &BTreeSet<PermissionName>,
        role_grants: impl IntoIterator<Item = PermissionName>,
        overrides: &[DirectGrant],
    ) -> Self {
        let mut permissions: BTreeSet<PermissionName> = role_grants.into_iter().collect();

        for grant in overrides.iter().filter(|grant| grant.is_explicit()) {
            if grant.granted {
                permissions.insert(grant.permission.clone());
            } else {
                permissions.remove(&grant.permission);
            }
        }

        permissions.retain(|permission| catalog.contains(permission));

        Self {
            bypass: false,
            permissions,
        }
    }

    /// Returns whether the super-administrator bypass produced this set.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.bypass
    }

    /// Returns whether the set holds the named permission.
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns whether at least one of the named permissions is held.
    #[must_use]
    pub fn intersects(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|permission| self.contains(permission))
    }

    /// Iterates permission names.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionName> {
        self.permissions.iter()
    }

    /// Returns the number of permissions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns whether no permission is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Consumes the set into its names.
    #[must_use]
    pub fn into_names(self) -> BTreeSet<PermissionName> {
        self.permissions
    }
}
