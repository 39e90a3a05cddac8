//! Default permission groups and identity validation bootstrap.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::identity::identity_validator;
use crate::lifecycle::BootstrapState;
use crate::permission::{PermissionGroup, PermissionStore};

/// Outcome of [`IdentityBootstrap::bootstrap_groups`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Groups created by this call, in creation order.
    pub created: Vec<PermissionGroup>,
    /// Names that already existed and were left untouched.
    pub skipped: Vec<String>,
    /// Names the store refused to create.
    pub failed: Vec<String>,
}

impl BootstrapReport {
    /// Whether the call changed nothing.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// Applies default groups, the identity validator and stale-data cleanup
/// to a permission store.
pub struct IdentityBootstrap {
    permission: Arc<dyn PermissionStore>,
    state: RwLock<BootstrapState>,
}

impl IdentityBootstrap {
    /// Create a bootstrap over `permission`.
    pub fn new(permission: Arc<dyn PermissionStore>) -> Self {
        Self {
            permission,
            state: RwLock::new(BootstrapState::Uninitialized),
        }
    }

    /// Current bootstrap state.
    pub fn state(&self) -> BootstrapState {
        *self.state.read()
    }

    /// Ensure every configured group exists.
    ///
    /// Missing groups are created with their name as title and a rank equal
    /// to the number of groups created so far in this call. Existing groups
    /// are skipped and keep their rank.
    pub fn bootstrap_groups<I, S>(&self, names: I) -> BootstrapReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BootstrapReport::default();
        let mut rank = 0;

        for name in names {
            let name = name.as_ref();
            if self.permission.group_exists(name) {
                tracing::debug!("Permission group {} already exists", name);
                report.skipped.push(name.to_string());
                continue;
            }

            // Ranks count created groups, so a refused name leaves no gap.
            if self.permission.create_group(name, name, rank) {
                report.created.push(PermissionGroup::new(name, name, rank));
                rank += 1;
            } else {
                tracing::warn!("Unable to create default permission group {}", name);
                report.failed.push(name.to_string());
            }
        }

        report
    }

    /// Install the player identity validator.
    pub fn register_identity_validator(&self) {
        self.permission.register_validate(identity_validator());
    }

    /// Purge permission data for identities that are no longer valid.
    pub fn cleanup_stale_data(&self) {
        self.permission.clean_up();
    }

    /// Run the full bootstrap.
    ///
    /// Fails with [`Error::CollaboratorUnavailable`] without touching the
    /// store when the permission system is not loaded.
    pub fn run<I, S>(&self, names: I) -> Result<BootstrapReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.permission.is_loaded() {
            return Err(Error::unavailable("permission system"));
        }

        {
            let mut state = self.state.write();
            if state.is_terminal() {
                tracing::debug!("Bootstrap already ran; re-applying default groups");
            } else if state.can_bootstrap() {
                *state = BootstrapState::Bootstrapping;
            }
        }

        let report = self.bootstrap_groups(names);
        self.register_identity_validator();
        self.cleanup_stale_data();

        *self.state.write() = BootstrapState::Ready;
        Ok(report)
    }
}

impl std::fmt::Debug for IdentityBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityBootstrap")
            .field("state", &self.state())
            .finish()
    }
}
