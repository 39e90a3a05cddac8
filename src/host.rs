//! Host-provided services: server identity, save/shutdown, remote logging
//! and analytics.

use crate::error::Result;

/// Read-only information about the running game server.
pub trait ServerInfo: Send + Sync {
    /// Game name.
    fn game_name(&self) -> &str;

    /// Server version.
    fn version(&self) -> &str;

    /// Network protocol version.
    fn protocol(&self) -> &str;

    /// Build date of the server binary.
    fn build_date(&self) -> &str;

    /// Version of the game engine.
    fn engine_version(&self) -> &str;

    /// Source-control changeset the server was built from.
    fn changeset(&self) -> &str;

    /// Source-control branch the server was built from.
    fn branch(&self) -> &str;
}

/// Plain [`ServerInfo`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct BuildInfo {
    /// Game name.
    pub game_name: String,
    /// Server version.
    pub version: String,
    /// Network protocol version.
    pub protocol: String,
    /// Build date.
    pub build_date: String,
    /// Engine version.
    pub engine_version: String,
    /// Changeset id.
    pub changeset: String,
    /// Branch name.
    pub branch: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            game_name: "Rust".to_string(),
            version: String::new(),
            protocol: String::new(),
            build_date: String::new(),
            engine_version: String::new(),
            changeset: String::new(),
            branch: "main".to_string(),
        }
    }
}

impl ServerInfo for BuildInfo {
    fn game_name(&self) -> &str {
        &self.game_name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn protocol(&self) -> &str {
        &self.protocol
    }

    fn build_date(&self) -> &str {
        &self.build_date
    }

    fn engine_version(&self) -> &str {
        &self.engine_version
    }

    fn changeset(&self) -> &str {
        &self.changeset
    }

    fn branch(&self) -> &str {
        &self.branch
    }
}

/// Save and shutdown services of the hosting framework.
pub trait HostServices: Send + Sync {
    /// Run the framework's save process.
    fn on_save(&self) -> Result<()>;

    /// Run the framework's shutdown process.
    fn on_shutdown(&self) -> Result<()>;

    /// Persist groups, users and other player data.
    fn save_player_data(&self) -> Result<()>;
}

/// Remote error reporting.
pub trait RemoteLogger: Send + Sync {
    /// Attach a tag to every report sent from now on.
    fn set_tag(&self, key: &str, value: &str);
}

/// Usage analytics.
pub trait Analytics: Send + Sync {
    /// Submit startup analytics.
    fn collect(&self) -> Result<()>;
}

/// Collaborator that does nothing. Used when a service is not wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl HostServices for Noop {
    fn on_save(&self) -> Result<()> {
        Ok(())
    }

    fn on_shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn save_player_data(&self) -> Result<()> {
        Ok(())
    }
}

impl RemoteLogger for Noop {
    fn set_tag(&self, _key: &str, _value: &str) {}
}

impl Analytics for Noop {
    fn collect(&self) -> Result<()> {
        Ok(())
    }
}
