//! One-time "server initialized" gate.
//!
//! The gate opens exactly once per process. Opening it broadcasts
//! [`ON_SERVER_INITIALIZED`] with `true` to every loaded plugin; plugins
//! loaded afterwards receive a single catch-up call with `false`.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::hook::{Value, ON_SERVER_INITIALIZED};
use crate::plugin::PluginHandle;
use crate::registry::PluginBroadcast;

/// Tracks whether the server has finished initializing.
pub struct InitializationGate {
    // Re-entrant: broadcast handlers may load plugins, which re-enters
    // `on_plugin_loaded` on the same thread.
    initialized: ReentrantMutex<Cell<bool>>,
    broadcast: Arc<dyn PluginBroadcast>,
}

impl InitializationGate {
    /// Create a closed gate that broadcasts through `broadcast`.
    pub fn new(broadcast: Arc<dyn PluginBroadcast>) -> Self {
        Self {
            initialized: ReentrantMutex::new(Cell::new(false)),
            broadcast,
        }
    }

    /// Whether the gate has opened.
    pub fn is_open(&self) -> bool {
        self.initialized.lock().get()
    }

    /// Open the gate.
    ///
    /// Returns true and broadcasts to all loaded plugins the first time;
    /// returns false without side effects afterwards.
    pub fn open(&self) -> bool {
        let initialized = self.initialized.lock();
        if initialized.get() {
            tracing::debug!("Server already initialized; ignoring duplicate signal");
            return false;
        }

        initialized.set(true);
        let reached = self
            .broadcast
            .call_hook(ON_SERVER_INITIALIZED, &[Value::Bool(true)]);
        tracing::debug!("Broadcast {} to {} plugins", ON_SERVER_INITIALIZED, reached);

        true
    }

    /// Deliver the catch-up notification to a plugin loaded after opening.
    ///
    /// Returns true if the plugin was notified. Before the gate opens this
    /// is a no-op; the plugin is reached by the broadcast instead.
    pub fn on_plugin_loaded(&self, plugin: &PluginHandle) -> bool {
        let initialized = self.initialized.lock();
        if !initialized.get() {
            return false;
        }

        tracing::debug!("Catching up late plugin {}", plugin.name());
        plugin.call_hook(ON_SERVER_INITIALIZED, &[Value::Bool(false)]);
        true
    }

    /// Run `f` while holding the gate lock.
    ///
    /// Registering a plugin and calling [`on_plugin_loaded`](Self::on_plugin_loaded)
    /// inside `f` keeps the pair atomic with respect to [`open`](Self::open),
    /// so the plugin is reached by exactly one of broadcast or catch-up.
    pub fn serialized<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.initialized.lock();
        f()
    }
}

impl std::fmt::Debug for InitializationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationGate")
            .field("initialized", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::{handle, RecordingPlugin};
    use crate::registry::PluginRegistry;

    fn setup() -> (Arc<PluginRegistry>, InitializationGate) {
        let registry = Arc::new(PluginRegistry::default_config());
        let gate = InitializationGate::new(registry.clone());
        (registry, gate)
    }

    #[test]
    fn test_open_fires_once() {
        let (registry, gate) = setup();
        let plugin = RecordingPlugin::new("early");
        registry.register(handle(&plugin)).unwrap();

        assert!(!gate.is_open());
        assert!(gate.open());
        assert!(gate.is_open());
        for _ in 0..5 {
            assert!(!gate.open());
        }

        assert_eq!(
            plugin.calls_to(ON_SERVER_INITIALIZED),
            vec![vec![Value::Bool(true)]]
        );
    }

    #[test]
    fn test_catch_up_before_open_is_noop() {
        let (registry, gate) = setup();
        let plugin = RecordingPlugin::new("early");
        let early = handle(&plugin);
        registry.register(early.clone()).unwrap();

        assert!(!gate.on_plugin_loaded(&early));
        assert!(plugin.calls_to(ON_SERVER_INITIALIZED).is_empty());

        gate.open();
        assert_eq!(plugin.calls_to(ON_SERVER_INITIALIZED).len(), 1);
    }

    #[test]
    fn test_catch_up_after_open() {
        let (registry, gate) = setup();
        let early = RecordingPlugin::new("early");
        registry.register(handle(&early)).unwrap();
        gate.open();

        let late = RecordingPlugin::new("late");
        let late_handle = handle(&late);
        registry.register(late_handle.clone()).unwrap();
        assert!(gate.on_plugin_loaded(&late_handle));

        assert_eq!(
            late.calls_to(ON_SERVER_INITIALIZED),
            vec![vec![Value::Bool(false)]]
        );
        // The broadcast was not re-run.
        assert_eq!(early.calls_to(ON_SERVER_INITIALIZED).len(), 1);
    }

    #[test]
    fn test_serialized_is_reentrant() {
        let (registry, gate) = setup();
        gate.open();

        let late = RecordingPlugin::new("late");
        let late_handle = handle(&late);
        let notified = gate.serialized(|| {
            registry.register(late_handle.clone()).unwrap();
            gate.on_plugin_loaded(&late_handle)
        });

        assert!(notified);
        assert_eq!(late.calls_to(ON_SERVER_INITIALIZED).len(), 1);
    }

    #[test]
    fn test_concurrent_open_fires_once() {
        let (registry, gate) = setup();
        let plugin = RecordingPlugin::new("early");
        registry.register(handle(&plugin)).unwrap();
        let gate = Arc::new(gate);

        let fired: usize = (0..8)
            .map(|_| {
                let gate = gate.clone();
                std::thread::spawn(move || gate.open())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|t| t.join().unwrap() as usize)
            .sum();

        assert_eq!(fired, 1);
        assert_eq!(plugin.calls_to(ON_SERVER_INITIALIZED).len(), 1);
    }
}
