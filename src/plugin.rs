//! Plugin representation as seen by the core plugin.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::hook::Value;

static NEXT_PLUGIN_ID: AtomicU64 = AtomicU64::new(1);

/// A plugin loaded by the host runtime.
///
/// The host owns plugin loading; the core plugin only needs to name a
/// plugin and deliver hooks to it.
pub trait Plugin: Send + Sync {
    /// Plugin name (unique within a registry).
    fn name(&self) -> &str;

    /// Plugin version.
    fn version(&self) -> &str {
        "0.0.0"
    }

    /// Plugin author.
    fn author(&self) -> &str {
        ""
    }

    /// Deliver a hook to this plugin.
    ///
    /// Returns `None` when the plugin does not handle the hook.
    fn call_hook(&self, hook: &str, args: &[Value]) -> Option<Value>;
}

/// Information about a loaded plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Unique plugin ID.
    pub id: u64,
    /// Plugin name.
    pub name: String,
    /// Plugin version.
    pub version: String,
    /// Plugin author.
    pub author: String,
    /// When the handle was created.
    pub loaded_at: Instant,
}

/// Handle to a loaded plugin for safe concurrent access.
#[derive(Clone)]
pub struct PluginHandle {
    id: u64,
    loaded_at: Instant,
    plugin: Arc<dyn Plugin>,
}

impl PluginHandle {
    /// Create a new plugin handle.
    pub fn new<P: Plugin + 'static>(plugin: P) -> Self {
        Self::from_arc(Arc::new(plugin))
    }

    /// Create a handle around a plugin that is already shared.
    pub fn from_arc(plugin: Arc<dyn Plugin>) -> Self {
        Self {
            id: NEXT_PLUGIN_ID.fetch_add(1, Ordering::Relaxed),
            loaded_at: Instant::now(),
            plugin,
        }
    }

    /// Get the plugin ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the plugin name.
    pub fn name(&self) -> String {
        self.plugin.name().to_string()
    }

    /// Deliver a hook to the plugin.
    pub fn call_hook(&self, hook: &str, args: &[Value]) -> Option<Value> {
        self.plugin.call_hook(hook, args)
    }

    /// Get plugin info.
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            id: self.id,
            name: self.plugin.name().to_string(),
            version: self.plugin.version().to_string(),
            author: self.plugin.author().to_string(),
            loaded_at: self.loaded_at,
        }
    }
}

impl PartialEq for PluginHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PluginHandle {}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("id", &self.id)
            .field("name", &self.plugin.name())
            .field("version", &self.plugin.version())
            .finish()
    }
}
