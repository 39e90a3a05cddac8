//! Permission store interface and an in-memory implementation.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::identity::IdentityValidator;

/// A named, ranked permission group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGroup {
    /// Unique group name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Priority used by the permission system.
    pub rank: i32,
}

impl PermissionGroup {
    /// Create a new group.
    pub fn new(name: impl Into<String>, title: impl Into<String>, rank: i32) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            rank,
        }
    }
}

/// The host's permission system.
pub trait PermissionStore: Send + Sync {
    /// Whether the permission system is loaded and usable.
    fn is_loaded(&self) -> bool;

    /// Check if a group exists.
    fn group_exists(&self, name: &str) -> bool;

    /// Create a group. Returns false if it could not be created.
    fn create_group(&self, name: &str, title: &str, rank: i32) -> bool;

    /// Install the predicate used to validate player identities.
    fn register_validate(&self, validator: IdentityValidator);

    /// Purge stale permission data.
    fn clean_up(&self);
}

/// In-memory [`PermissionStore`].
///
/// Users are keyed by identity and hold the names of the groups they
/// belong to. [`clean_up`](PermissionStore::clean_up) drops users that fail
/// the registered validator and memberships of groups that no longer exist.
pub struct MemoryPermissionStore {
    loaded: AtomicBool,
    groups: DashMap<String, PermissionGroup>,
    users: DashMap<String, BTreeSet<String>>,
    validator: RwLock<Option<IdentityValidator>>,
}

impl MemoryPermissionStore {
    /// Create an empty, loaded store.
    pub fn new() -> Self {
        Self {
            loaded: AtomicBool::new(true),
            groups: DashMap::new(),
            users: DashMap::new(),
            validator: RwLock::new(None),
        }
    }

    /// Mark the store as loaded or disabled.
    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::Relaxed);
    }

    /// Get a group by name.
    pub fn group(&self, name: &str) -> Option<PermissionGroup> {
        self.groups.get(name).map(|g| g.clone())
    }

    /// All groups ordered by rank, then name.
    pub fn groups(&self) -> Vec<PermissionGroup> {
        let mut groups: Vec<_> = self.groups.iter().map(|g| g.clone()).collect();
        groups.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.name.cmp(&b.name)));
        groups
    }

    /// Remove a group. Memberships are left for `clean_up` to purge.
    pub fn remove_group(&self, name: &str) -> bool {
        self.groups.remove(name).is_some()
    }

    /// Add a user to a group, creating the user record if needed.
    pub fn add_user_group(&self, identity: &str, group: &str) {
        self.users
            .entry(identity.to_string())
            .or_default()
            .insert(group.to_string());
    }

    /// Groups a user belongs to.
    pub fn user_groups(&self, identity: &str) -> Option<Vec<String>> {
        self.users
            .get(identity)
            .map(|groups| groups.iter().cloned().collect())
    }

    /// Known user identities, sorted.
    pub fn users(&self) -> Vec<String> {
        let mut users: Vec<_> = self.users.iter().map(|u| u.key().clone()).collect();
        users.sort();
        users
    }

    /// Whether a validator has been registered.
    pub fn has_validator(&self) -> bool {
        self.validator.read().is_some()
    }

    /// Run the registered validator, accepting everything if none is set.
    pub fn validate(&self, identity: &str) -> bool {
        self.validator.read().as_ref().map_or(true, |v| v(identity))
    }
}

impl Default for MemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionStore for MemoryPermissionStore {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Relaxed)
    }

    fn group_exists(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    fn create_group(&self, name: &str, title: &str, rank: i32) -> bool {
        if name.is_empty() {
            return false;
        }
        match self.groups.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(PermissionGroup::new(name, title, rank));
                true
            }
        }
    }

    fn register_validate(&self, validator: IdentityValidator) {
        *self.validator.write() = Some(validator);
    }

    fn clean_up(&self) {
        let validator = self.validator.read().clone();

        if let Some(validator) = validator {
            let before = self.users.len();
            self.users.retain(|identity, _| validator(identity.as_str()));
            let removed = before - self.users.len();
            if removed > 0 {
                tracing::info!("Removed {} users with invalid identities", removed);
            }
        }

        let groups = &self.groups;
        for mut user in self.users.iter_mut() {
            user.value_mut().retain(|g| groups.contains_key(g));
        }
    }
}

impl std::fmt::Debug for MemoryPermissionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPermissionStore")
            .field("loaded", &self.is_loaded())
            .field("group_count", &self.groups.len())
            .field("user_count", &self.users.len())
            .field("has_validator", &self.has_validator())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::identity_validator;

    #[test]
    fn test_create_group_once() {
        let store = MemoryPermissionStore::new();

        assert!(store.create_group("admin", "Administrators", 0));
        assert!(!store.create_group("admin", "Other", 5));
        assert!(!store.create_group("", "", 1));

        let admin = store.group("admin").unwrap();
        assert_eq!(admin.title, "Administrators");
        assert_eq!(admin.rank, 0);
    }

    #[test]
    fn test_groups_sorted_by_rank() {
        let store = MemoryPermissionStore::new();
        store.create_group("vip", "vip", 2);
        store.create_group("admin", "admin", 0);
        store.create_group("default", "default", 1);

        let names: Vec<_> = store.groups().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["admin", "default", "vip"]);
    }

    #[test]
    fn test_clean_up_removes_invalid_users() {
        let store = MemoryPermissionStore::new();
        store.create_group("default", "default", 0);
        store.add_user_group("76561198000000001", "default");
        store.add_user_group("12345", "default");

        // Nothing is purged before a validator is registered.
        store.clean_up();
        assert_eq!(store.users().len(), 2);

        store.register_validate(identity_validator());
        store.clean_up();
        assert_eq!(store.users(), vec!["76561198000000001"]);
    }

    #[test]
    fn test_clean_up_drops_missing_group_memberships() {
        let store = MemoryPermissionStore::new();
        store.create_group("default", "default", 0);
        store.create_group("vip", "vip", 1);
        store.add_user_group("76561198000000001", "default");
        store.add_user_group("76561198000000001", "vip");

        store.remove_group("vip");
        store.clean_up();

        assert_eq!(
            store.user_groups("76561198000000001").unwrap(),
            vec!["default"]
        );
    }
}
