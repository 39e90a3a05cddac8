//! # rust-server-core
//!
//! Core game plugin for Rust dedicated servers running a multi-game plugin
//! framework. It connects the framework's generic plugin lifecycle to the
//! game server.
//!
//! This crate provides:
//! - **Initialization Gate** - Fire `OnServerInitialized` exactly once, and
//!   catch up plugins loaded after the server finished starting
//! - **Identity Bootstrap** - Create default permission groups, install the
//!   player identity validator and purge stale permission data
//! - **Hook Dispatch** - Map host hook names onto the [`GameHooks`] interface
//! - **Version Command** - Build and protocol report for the server console
//! - **Localization** - Built-in message tables for the core plugin
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rust_server_core::{Collaborators, PluginRuntime, RuntimeConfig};
//!
//! let collab = Collaborators::new(permission, localization, server, commands);
//! let runtime = PluginRuntime::new(RuntimeConfig::default(), collab);
//!
//! runtime.init();
//! runtime.load(plugin)?;
//! runtime.server_initialized();
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Configuration parsing and serialization
//! - `metrics-prometheus`: Prometheus metrics integration

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod bootstrap;
mod command;
mod config;
mod error;
mod game;
mod gate;
mod host;
mod identity;
mod lifecycle;
mod localization;
mod permission;
mod plugin;
mod registry;
mod runtime;

pub mod hook;

#[cfg(feature = "metrics-prometheus")]
mod metrics;

pub use bootstrap::{BootstrapReport, IdentityBootstrap};
pub use command::{
    format_version_report, version_command, CommandCaller, CommandChannel, CommandHandler,
    CommandTable, VERSION_COMMAND,
};
pub use config::CoreConfig;
pub use error::{Error, Result};
pub use game::{Collaborators, GameCore, TITLE};
pub use gate::InitializationGate;
pub use hook::{GameHooks, Value};
pub use host::{Analytics, BuildInfo, HostServices, Noop, RemoteLogger, ServerInfo};
pub use identity::{
    identity_digits, identity_validator, is_valid_identity, IdentityValidator, MIN_IDENTITY_DIGITS,
};
pub use lifecycle::{BootstrapState, LifecycleEvent, LifecycleHooks};
pub use localization::{
    default_languages, LocalizationStore, MemoryLocalizationStore, MessageTable, DEFAULT_LANGUAGE,
};
pub use permission::{MemoryPermissionStore, PermissionGroup, PermissionStore};
pub use plugin::{Plugin, PluginHandle, PluginInfo};
pub use registry::{PluginBroadcast, PluginRegistry, RegistryConfig};
pub use runtime::{PluginRuntime, RuntimeConfig};

#[cfg(feature = "metrics-prometheus")]
pub use metrics::{CoreMetrics, MetricsConfig};

/// Crate version reported by the `version` command.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
