//! Hook dispatch runtime.
//!
//! [`PluginRuntime`] plays the host's role: it owns the plugin registry,
//! forwards lifecycle hooks to the [`GameCore`], and keeps plugin loading
//! consistent with the one-time server-initialized signal.

use std::sync::Arc;

use crate::config::CoreConfig;
use crate::error::Result;
use crate::game::{Collaborators, GameCore};
use crate::hook::{self, GameHooks, Value};
use crate::lifecycle::LifecycleEvent;
use crate::plugin::PluginHandle;
use crate::registry::{PluginRegistry, RegistryConfig};

/// Configuration for the plugin runtime.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Registry configuration.
    pub registry: RegistryConfig,
    /// Core plugin configuration.
    pub core: CoreConfig,
}

impl RuntimeConfig {
    /// Create a new runtime configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry configuration.
    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    /// Set the core plugin configuration.
    pub fn with_core(mut self, core: CoreConfig) -> Self {
        self.core = core;
        self
    }
}

/// Plugin runtime driving the core plugin.
pub struct PluginRuntime {
    registry: Arc<PluginRegistry>,
    core: GameCore,
}

impl PluginRuntime {
    /// Create a runtime. Its registry is the core plugin's broadcast target.
    pub fn new(config: RuntimeConfig, collab: Collaborators) -> Self {
        let registry = Arc::new(PluginRegistry::new(config.registry));
        let core = GameCore::new(config.core, registry.clone(), collab);

        Self { registry, core }
    }

    /// Get the plugin registry.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Get the core plugin.
    pub fn core(&self) -> &GameCore {
        &self.core
    }

    /// Add a lifecycle event handler.
    pub fn on_event<F>(&self, handler: F)
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.core.on_event(handler);
    }

    /// Run the core plugin's `Init` hook.
    pub fn init(&self) {
        self.core.init();
    }

    /// Load a plugin and fire `OnPluginLoaded` for it.
    pub fn load(&self, plugin: PluginHandle) -> Result<()> {
        self.attach(plugin, false)
    }

    // Registration and catch-up share the gate lock so the plugin is reached
    // by exactly one of broadcast or catch-up.
    fn attach(&self, plugin: PluginHandle, allow_registered: bool) -> Result<()> {
        self.core.gate().serialized(|| -> Result<()> {
            let registered = self.registry.get(&plugin.name()).as_ref() == Some(&plugin);
            if !(allow_registered && registered) {
                self.registry.register(plugin.clone())?;
                tracing::debug!("Loaded plugin {}", plugin.name());
            }
            self.core.on_plugin_loaded(&plugin);
            Ok(())
        })
    }

    /// Unload a plugin by name.
    pub fn unload(&self, name: &str) -> Result<PluginHandle> {
        self.registry.unregister(name)
    }

    /// Get a plugin by name.
    pub fn get(&self, name: &str) -> Option<PluginHandle> {
        self.registry.get(name)
    }

    /// Get plugin count.
    pub fn plugin_count(&self) -> usize {
        self.registry.len()
    }

    /// Signal that the server finished starting.
    pub fn server_initialized(&self) -> bool {
        self.core.on_server_initialized()
    }

    /// Dispatch a host hook by name.
    ///
    /// `OnPluginLoaded` registers the announced plugin unless that same
    /// plugin is already loaded.
    pub fn dispatch(&self, name: &str, args: &[Value]) -> Result<()> {
        if name == hook::ON_PLUGIN_LOADED {
            let plugin = hook::plugin_arg(name, args)?;
            return self.attach(plugin.clone(), true);
        }
        hook::dispatch(&self.core, name, args)
    }

    /// Fire the save hook.
    pub fn save(&self) {
        self.core.on_server_save();
    }

    /// Fire the shutdown hook and drop all plugins.
    pub fn shutdown(&self) {
        self.core.on_server_shutdown();
        self.registry.clear();
    }
}

impl std::fmt::Debug for PluginRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRuntime")
            .field("core", &self.core)
            .field("plugin_count", &self.registry.len())
            .finish()
    }
}
