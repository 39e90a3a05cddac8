//! Core plugin lifecycle state and events.

use std::sync::Arc;
use std::time::Instant;

/// Bootstrap state of the core plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapState {
    /// `Init` has not been handled yet.
    Uninitialized,
    /// Default groups, validator and cleanup are being applied.
    Bootstrapping,
    /// Bootstrap finished.
    Ready,
}

impl BootstrapState {
    /// Check if bootstrap can start from this state.
    pub fn can_bootstrap(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    /// Check if the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl std::fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Bootstrapping => "bootstrapping",
            Self::Ready => "ready",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle event for observers.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// A default permission group was created.
    GroupCreated {
        /// Group name.
        name: String,
        /// Assigned rank.
        rank: i32,
        /// Event time.
        at: Instant,
    },
    /// Bootstrap finished.
    Ready {
        /// Event time.
        at: Instant,
    },
    /// The server-initialized broadcast went out.
    ServerInitialized {
        /// Event time.
        at: Instant,
    },
    /// A late plugin received its catch-up notification.
    CaughtUp {
        /// Plugin name.
        plugin: String,
        /// Event time.
        at: Instant,
    },
    /// The server saved.
    Saved {
        /// Event time.
        at: Instant,
    },
    /// The server shut down.
    ShutDown {
        /// Event time.
        at: Instant,
    },
}

impl LifecycleEvent {
    /// Get the event timestamp.
    pub fn timestamp(&self) -> Instant {
        match self {
            Self::GroupCreated { at, .. } => *at,
            Self::Ready { at } => *at,
            Self::ServerInitialized { at } => *at,
            Self::CaughtUp { at, .. } => *at,
            Self::Saved { at } => *at,
            Self::ShutDown { at } => *at,
        }
    }

    /// Get the event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::GroupCreated { .. } => "group_created",
            Self::Ready { .. } => "ready",
            Self::ServerInitialized { .. } => "server_initialized",
            Self::CaughtUp { .. } => "caught_up",
            Self::Saved { .. } => "saved",
            Self::ShutDown { .. } => "shut_down",
        }
    }
}

/// Hooks for lifecycle events.
///
/// Cloning is cheap and shares the handlers.
#[derive(Clone)]
pub struct LifecycleHooks {
    handlers: Vec<Arc<dyn Fn(&LifecycleEvent) + Send + Sync>>,
}

impl LifecycleHooks {
    /// Create new lifecycle hooks.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a lifecycle event handler.
    pub fn on_event<F>(&mut self, handler: F)
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    /// Emit a lifecycle event.
    pub fn emit(&self, event: LifecycleEvent) {
        for handler in &self.handlers {
            handler(&event);
        }
    }

    /// Emit a group created event.
    pub fn emit_group_created(&self, name: &str, rank: i32) {
        self.emit(LifecycleEvent::GroupCreated {
            name: name.to_string(),
            rank,
            at: Instant::now(),
        });
    }

    /// Emit a ready event.
    pub fn emit_ready(&self) {
        self.emit(LifecycleEvent::Ready { at: Instant::now() });
    }

    /// Emit a server initialized event.
    pub fn emit_server_initialized(&self) {
        self.emit(LifecycleEvent::ServerInitialized { at: Instant::now() });
    }

    /// Emit a caught up event.
    pub fn emit_caught_up(&self, plugin: &str) {
        self.emit(LifecycleEvent::CaughtUp {
            plugin: plugin.to_string(),
            at: Instant::now(),
        });
    }

    /// Emit a saved event.
    pub fn emit_saved(&self) {
        self.emit(LifecycleEvent::Saved { at: Instant::now() });
    }

    /// Emit a shut down event.
    pub fn emit_shut_down(&self) {
        self.emit(LifecycleEvent::ShutDown { at: Instant::now() });
    }
}

impl Default for LifecycleHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}
