//! Plugin registry and hook broadcast.

use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::hook::Value;
use crate::plugin::{PluginHandle, PluginInfo};

/// Fans a hook out to every loaded plugin.
pub trait PluginBroadcast: Send + Sync {
    /// Call `hook` on all loaded plugins. Returns how many were called.
    fn call_hook(&self, hook: &str, args: &[Value]) -> usize;
}

/// Configuration for the plugin registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of plugins allowed.
    pub max_plugins: usize,
    /// Whether to allow plugin overwrites.
    pub allow_overwrite: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_plugins: 256,
            allow_overwrite: false,
        }
    }
}

impl RegistryConfig {
    /// Create a new registry configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of plugins.
    pub fn with_max_plugins(mut self, max: usize) -> Self {
        self.max_plugins = max;
        self
    }

    /// Allow plugin overwrites.
    pub fn with_allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }
}

/// Plugin registry for managing loaded plugins.
pub struct PluginRegistry {
    config: RegistryConfig,
    plugins: DashMap<String, PluginHandle>,
}

impl PluginRegistry {
    /// Create a new plugin registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            plugins: DashMap::new(),
        }
    }

    /// Create with default configuration.
    pub fn default_config() -> Self {
        Self::new(RegistryConfig::default())
    }

    /// Get the registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a plugin.
    pub fn register(&self, plugin: PluginHandle) -> Result<()> {
        let name = plugin.name();

        if self.plugins.contains_key(&name) {
            if !self.config.allow_overwrite {
                return Err(Error::PluginAlreadyLoaded(name));
            }
        } else if self.plugins.len() >= self.config.max_plugins {
            return Err(Error::Registry(format!(
                "registry full: max {} plugins",
                self.config.max_plugins
            )));
        }

        if self.plugins.insert(name.clone(), plugin).is_some() {
            tracing::debug!("Replaced plugin {}", name);
        }

        Ok(())
    }

    /// Unregister a plugin by name.
    pub fn unregister(&self, name: &str) -> Result<PluginHandle> {
        self.plugins
            .remove(name)
            .map(|(_, plugin)| plugin)
            .ok_or_else(|| Error::plugin_not_found(name))
    }

    /// Get a plugin by name.
    pub fn get(&self, name: &str) -> Option<PluginHandle> {
        self.plugins.get(name).map(|r| r.clone())
    }

    /// Check if a plugin exists.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Get all plugin names.
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|r| r.key().clone()).collect()
    }

    /// Get all plugins.
    pub fn all(&self) -> Vec<PluginHandle> {
        self.plugins.iter().map(|r| r.value().clone()).collect()
    }

    /// Get plugin count.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Get all plugin info.
    pub fn info(&self) -> Vec<PluginInfo> {
        self.plugins.iter().map(|r| r.info()).collect()
    }

    /// Remove all plugins.
    pub fn clear(&self) {
        self.plugins.clear();
    }
}

impl PluginBroadcast for PluginRegistry {
    fn call_hook(&self, hook: &str, args: &[Value]) -> usize {
        // Snapshot first: a hook handler may load or unload plugins.
        let plugins = self.all();
        for plugin in &plugins {
            plugin.call_hook(hook, args);
        }
        plugins.len()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("config", &self.config)
            .field("plugin_count", &self.plugins.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::{handle, RecordingPlugin};

    fn create_test_plugin(name: &str) -> PluginHandle {
        handle(&RecordingPlugin::new(name))
    }

    #[test]
    fn test_registry_creation() {
        let registry = PluginRegistry::default_config();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_plugin() {
        let registry = PluginRegistry::default_config();
        registry.register(create_test_plugin("test-plugin")).unwrap();

        assert!(registry.contains("test-plugin"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_duplicate() {
        let registry = PluginRegistry::default_config();

        registry.register(create_test_plugin("test-plugin")).unwrap();
        let result = registry.register(create_test_plugin("test-plugin"));

        assert!(matches!(result, Err(Error::PluginAlreadyLoaded(_))));
    }

    #[test]
    fn test_register_duplicate_with_overwrite() {
        let config = RegistryConfig::new().with_allow_overwrite(true);
        let registry = PluginRegistry::new(config);

        let plugin1 = create_test_plugin("test-plugin");
        let plugin2 = create_test_plugin("test-plugin");
        let id2 = plugin2.id();

        registry.register(plugin1).unwrap();
        registry.register(plugin2).unwrap();

        assert_eq!(registry.get("test-plugin").unwrap().id(), id2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_plugin() {
        let registry = PluginRegistry::default_config();
        registry.register(create_test_plugin("test-plugin")).unwrap();

        registry.unregister("test-plugin").unwrap();
        assert!(!registry.contains("test-plugin"));

        let result = registry.unregister("test-plugin");
        assert!(matches!(result, Err(Error::PluginNotFound(_))));
    }

    #[test]
    fn test_max_plugins() {
        let config = RegistryConfig::new().with_max_plugins(2);
        let registry = PluginRegistry::new(config);

        registry.register(create_test_plugin("plugin-1")).unwrap();
        registry.register(create_test_plugin("plugin-2")).unwrap();

        let result = registry.register(create_test_plugin("plugin-3"));
        assert!(matches!(result, Err(Error::Registry(_))));
    }

    #[test]
    fn test_broadcast_reaches_every_plugin() {
        let registry = PluginRegistry::default_config();
        let plugins: Vec<_> = ["a", "b", "c"].iter().map(|n| RecordingPlugin::new(n)).collect();
        for plugin in &plugins {
            registry.register(handle(plugin)).unwrap();
        }

        let reached = registry.call_hook("OnServerSave", &[]);

        assert_eq!(reached, 3);
        for plugin in &plugins {
            assert_eq!(plugin.calls_to("OnServerSave").len(), 1);
        }
    }
}
