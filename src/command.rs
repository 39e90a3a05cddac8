//! The `version` command and the command channel it is registered on.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::host::ServerInfo;

/// Name of the version command.
pub const VERSION_COMMAND: &str = "version";

/// Whoever ran a command: the server console or a connected player.
pub trait CommandCaller {
    /// True for the server console.
    fn is_server(&self) -> bool;

    /// Display name of the caller.
    fn name(&self) -> &str;

    /// Send a reply to the caller.
    fn reply(&self, message: &str);
}

/// Command callback: caller, command name, arguments.
pub type CommandHandler = Arc<dyn Fn(&dyn CommandCaller, &str, &[String]) + Send + Sync>;

/// The host's command registration surface.
pub trait CommandChannel: Send + Sync {
    /// Register `handler` under `name`.
    fn register(&self, name: &str, handler: CommandHandler);

    /// The host's generic version reply, used for non-console callers.
    fn default_version(&self, caller: &dyn CommandCaller, command: &str, args: &[String]);
}

/// Multi-line version report shown on the server console.
pub fn format_version_report(server: &dyn ServerInfo, core_version: &str) -> String {
    format!(
        "Protocol: {}\nBuild Date: {}\nUnity Version: {}\nChangeset: {}\nBranch: {}\nRust Core Version: {}",
        server.protocol(),
        server.build_date(),
        server.engine_version(),
        server.changeset(),
        server.branch(),
        core_version,
    )
}

/// Handle the `version` command.
pub fn version_command(
    server: &dyn ServerInfo,
    channel: &dyn CommandChannel,
    caller: &dyn CommandCaller,
    command: &str,
    args: &[String],
) {
    if caller.is_server() {
        caller.reply(&format_version_report(server, crate::VERSION));
    } else {
        channel.default_version(caller, command, args);
    }
}

/// In-memory [`CommandChannel`].
pub struct CommandTable {
    server: Arc<dyn ServerInfo>,
    commands: DashMap<String, CommandHandler>,
}

impl CommandTable {
    /// Create an empty table answering generic version requests from `server`.
    pub fn new(server: Arc<dyn ServerInfo>) -> Self {
        Self {
            server,
            commands: DashMap::new(),
        }
    }

    /// Check if a command is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Run a registered command.
    pub fn execute(&self, caller: &dyn CommandCaller, name: &str, args: &[String]) -> Result<()> {
        // Clone out so the handler may register further commands.
        let handler = self
            .commands
            .get(name)
            .map(|h| h.clone())
            .ok_or_else(|| Error::collaborator(format!("unknown command: {}", name)))?;
        handler(caller, name, args);
        Ok(())
    }
}

impl CommandChannel for CommandTable {
    fn register(&self, name: &str, handler: CommandHandler) {
        if self.commands.insert(name.to_string(), handler).is_some() {
            tracing::debug!("Command {} re-registered", name);
        }
    }

    fn default_version(&self, caller: &dyn CommandCaller, _command: &str, _args: &[String]) {
        caller.reply(&format!(
            "Server is running {} version {}",
            self.server.game_name(),
            self.server.version()
        ));
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("command_count", &self.commands.len())
            .finish()
    }
}
