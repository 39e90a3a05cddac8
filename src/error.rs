//! Error types for core plugin operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while the core plugin reacts to host events.
#[derive(Error, Debug)]
pub enum Error {
    /// Plugin not found.
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    /// Plugin already loaded.
    #[error("plugin already loaded: {0}")]
    PluginAlreadyLoaded(String),

    /// Registry error.
    #[error("registry error: {0}")]
    Registry(String),

    /// The host dispatched a hook this plugin does not handle.
    #[error("unknown hook: {0}")]
    UnknownHook(String),

    /// A hook was dispatched with arguments of the wrong shape.
    #[error("invalid arguments for hook {hook}: {reason}")]
    InvalidHookArgs {
        /// Hook name.
        hook: String,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// A collaborating library is not loaded.
    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// A collaborating library reported a failure.
    #[error("collaborator failed: {0}")]
    Collaborator(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error.
    #[cfg(feature = "serde")]
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

impl Error {
    /// Create a plugin not found error.
    pub fn plugin_not_found(name: impl Into<String>) -> Self {
        Self::PluginNotFound(name.into())
    }

    /// Create an unknown hook error.
    pub fn unknown_hook(name: impl Into<String>) -> Self {
        Self::UnknownHook(name.into())
    }

    /// Create an invalid hook arguments error.
    pub fn invalid_hook_args(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHookArgs {
            hook: hook.into(),
            reason: reason.into(),
        }
    }

    /// Create a collaborator unavailable error.
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable(name.into())
    }

    /// Create a collaborator failure error.
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }
}
