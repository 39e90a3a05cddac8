//! Hook names, hook values and the inbound hook interface.
//!
//! The host runtime delivers lifecycle hooks by name. [`GameHooks`] is the
//! set of hooks the core plugin reacts to, and [`dispatch`] maps a host hook
//! name onto it.

use crate::error::{Error, Result};
use crate::plugin::PluginHandle;

/// Hook fired once when the core plugin is initializing.
pub const INIT: &str = "Init";
/// Hook fired after any other plugin has been loaded.
pub const ON_PLUGIN_LOADED: &str = "OnPluginLoaded";
/// Internal hook fired by the host when the server finished starting.
pub const I_ON_SERVER_INITIALIZED: &str = "IOnServerInitialized";
/// Hook broadcast to plugins once the server is fully initialized.
pub const ON_SERVER_INITIALIZED: &str = "OnServerInitialized";
/// Hook fired when the server saves.
pub const ON_SERVER_SAVE: &str = "OnServerSave";
/// Hook fired when the server shuts down.
pub const ON_SERVER_SHUTDOWN: &str = "OnServerShutdown";

/// A hook argument or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// String value.
    Str(String),
    /// A loaded plugin.
    Plugin(PluginHandle),
}

impl Value {
    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the plugin if this is a `Plugin`.
    pub fn as_plugin(&self) -> Option<&PluginHandle> {
        match self {
            Self::Plugin(p) => Some(p),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<PluginHandle> for Value {
    fn from(p: PluginHandle) -> Self {
        Self::Plugin(p)
    }
}

/// Lifecycle hooks the core plugin handles.
///
/// Preconditions: the host calls these one at a time, `init` before
/// `on_server_initialized`. `on_plugin_loaded` may arrive before or after
/// the server is initialized.
pub trait GameHooks {
    /// The core plugin is initializing.
    fn init(&self);

    /// Another plugin has been loaded.
    fn on_plugin_loaded(&self, plugin: &PluginHandle);

    /// The server finished starting. Returns true only the first time.
    fn on_server_initialized(&self) -> bool;

    /// The server is saving.
    fn on_server_save(&self);

    /// The server is shutting down.
    fn on_server_shutdown(&self);
}

/// Extract the plugin argument of an `OnPluginLoaded` call.
pub fn plugin_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a PluginHandle> {
    args.first()
        .and_then(Value::as_plugin)
        .ok_or_else(|| Error::invalid_hook_args(name, "expected a plugin argument"))
}

/// Dispatch a host hook by name.
pub fn dispatch<H: GameHooks + ?Sized>(hooks: &H, name: &str, args: &[Value]) -> Result<()> {
    match name {
        INIT => hooks.init(),
        ON_PLUGIN_LOADED => hooks.on_plugin_loaded(plugin_arg(name, args)?),
        I_ON_SERVER_INITIALIZED => {
            hooks.on_server_initialized();
        }
        ON_SERVER_SAVE => hooks.on_server_save(),
        ON_SERVER_SHUTDOWN => hooks.on_server_shutdown(),
        other => return Err(Error::unknown_hook(other)),
    }
    Ok(())
}
