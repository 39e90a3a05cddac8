//! The core game plugin.
//!
//! [`GameCore`] reacts to the host's lifecycle hooks: it tags remote error
//! reports, registers localized messages and the `version` command, makes
//! sure the default permission groups exist, and signals every plugin once
//! the server has finished starting.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::bootstrap::IdentityBootstrap;
use crate::command::{version_command, CommandCaller, CommandChannel, CommandHandler, VERSION_COMMAND};
use crate::config::CoreConfig;
use crate::gate::InitializationGate;
use crate::hook::GameHooks;
use crate::host::{Analytics, HostServices, Noop, RemoteLogger, ServerInfo};
use crate::lifecycle::{BootstrapState, LifecycleEvent, LifecycleHooks};
use crate::localization::{default_languages, LocalizationStore};
use crate::permission::PermissionStore;
use crate::plugin::PluginHandle;
use crate::registry::PluginBroadcast;

#[cfg(feature = "metrics-prometheus")]
use crate::metrics::CoreMetrics;

/// Title of the core plugin; also the owner of its localized messages.
pub const TITLE: &str = "Rust";

/// Services the core plugin talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Permission system.
    pub permission: Arc<dyn PermissionStore>,
    /// Localization library.
    pub localization: Arc<dyn LocalizationStore>,
    /// Game server identity.
    pub server: Arc<dyn ServerInfo>,
    /// Command registration.
    pub commands: Arc<dyn CommandChannel>,
    /// Save and shutdown services.
    pub host: Arc<dyn HostServices>,
    /// Remote error reporting.
    pub remote_logger: Arc<dyn RemoteLogger>,
    /// Usage analytics.
    pub analytics: Arc<dyn Analytics>,
}

impl Collaborators {
    /// Bundle the required collaborators. Host services, remote logging
    /// and analytics default to no-ops.
    pub fn new(
        permission: Arc<dyn PermissionStore>,
        localization: Arc<dyn LocalizationStore>,
        server: Arc<dyn ServerInfo>,
        commands: Arc<dyn CommandChannel>,
    ) -> Self {
        Self {
            permission,
            localization,
            server,
            commands,
            host: Arc::new(Noop),
            remote_logger: Arc::new(Noop),
            analytics: Arc::new(Noop),
        }
    }

    /// Set the host services.
    pub fn with_host(mut self, host: Arc<dyn HostServices>) -> Self {
        self.host = host;
        self
    }

    /// Set the remote logger.
    pub fn with_remote_logger(mut self, remote_logger: Arc<dyn RemoteLogger>) -> Self {
        self.remote_logger = remote_logger;
        self
    }

    /// Set the analytics collector.
    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics>) -> Self {
        self.analytics = analytics;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("game", &self.server.game_name())
            .field("server_version", &self.server.version())
            .field("permission_loaded", &self.permission.is_loaded())
            .finish()
    }
}

/// The core game plugin.
pub struct GameCore {
    config: CoreConfig,
    collab: Collaborators,
    gate: InitializationGate,
    bootstrap: IdentityBootstrap,
    hooks: RwLock<LifecycleHooks>,
    #[cfg(feature = "metrics-prometheus")]
    metrics: Option<Arc<CoreMetrics>>,
}

impl GameCore {
    /// Create the core plugin. `broadcast` reaches every loaded plugin.
    pub fn new(config: CoreConfig, broadcast: Arc<dyn PluginBroadcast>, collab: Collaborators) -> Self {
        let gate = InitializationGate::new(broadcast);
        let bootstrap = IdentityBootstrap::new(collab.permission.clone());

        Self {
            config,
            collab,
            gate,
            bootstrap,
            hooks: RwLock::new(LifecycleHooks::new()),
            #[cfg(feature = "metrics-prometheus")]
            metrics: None,
        }
    }

    /// Attach a metrics collector.
    #[cfg(feature = "metrics-prometheus")]
    pub fn with_metrics(mut self, metrics: Arc<CoreMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Get the collaborators.
    pub fn collaborators(&self) -> &Collaborators {
        &self.collab
    }

    /// Get the initialization gate.
    pub fn gate(&self) -> &InitializationGate {
        &self.gate
    }

    /// Whether the server-initialized signal has fired.
    pub fn is_server_initialized(&self) -> bool {
        self.gate.is_open()
    }

    /// Current bootstrap state.
    pub fn bootstrap_state(&self) -> BootstrapState {
        self.bootstrap.state()
    }

    /// Add a lifecycle event handler.
    ///
    /// Handlers may add further handlers; those see later events only.
    pub fn on_event<F>(&self, handler: F)
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.hooks.write().on_event(handler);
    }

    // Snapshot so no lock is held while handlers run.
    fn hooks(&self) -> LifecycleHooks {
        self.hooks.read().clone()
    }

    /// Answer the `version` command for `caller`.
    pub fn version(&self, caller: &dyn CommandCaller, args: &[String]) {
        version_command(
            self.collab.server.as_ref(),
            self.collab.commands.as_ref(),
            caller,
            VERSION_COMMAND,
            args,
        );
    }

    fn register_version_command(&self) {
        let server = self.collab.server.clone();
        // Weak: the channel owns the handler.
        let channel = Arc::downgrade(&self.collab.commands);
        let handler: CommandHandler = Arc::new(
            move |caller: &dyn CommandCaller, command: &str, args: &[String]| {
                if let Some(channel) = channel.upgrade() {
                    version_command(server.as_ref(), channel.as_ref(), caller, command, args);
                }
            },
        );
        self.collab.commands.register(VERSION_COMMAND, handler);
    }

    fn register_messages(&self) {
        for (language, messages) in default_languages() {
            self.collab
                .localization
                .register_messages(&messages, TITLE, language);
        }
    }

    fn bootstrap_permissions(&self) {
        let report = match self.bootstrap.run(&self.config.default_groups) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!("{}; skipping default groups", err);
                return;
            }
        };

        let hooks = self.hooks();
        for group in &report.created {
            tracing::info!("Created permission group {} with rank {}", group.name, group.rank);
            hooks.emit_group_created(&group.name, group.rank);
        }
        self.record_groups_created(report.created.len());
        hooks.emit_ready();
    }

    fn report_failure(&self, what: &str, err: &crate::Error) {
        tracing::warn!("{} failed: {}", what, err);
        self.record_collaborator_error();
    }

    #[cfg(feature = "metrics-prometheus")]
    fn record_broadcast(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_broadcast();
        }
    }

    #[cfg(not(feature = "metrics-prometheus"))]
    fn record_broadcast(&self) {}

    #[cfg(feature = "metrics-prometheus")]
    fn record_catch_up(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_catch_up();
        }
    }

    #[cfg(not(feature = "metrics-prometheus"))]
    fn record_catch_up(&self) {}

    #[cfg(feature = "metrics-prometheus")]
    fn record_groups_created(&self, count: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.record_groups_created(count);
        }
    }

    #[cfg(not(feature = "metrics-prometheus"))]
    fn record_groups_created(&self, _count: usize) {}

    #[cfg(feature = "metrics-prometheus")]
    fn record_collaborator_error(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_collaborator_error();
        }
    }

    #[cfg(not(feature = "metrics-prometheus"))]
    fn record_collaborator_error(&self) {}
}

impl GameHooks for GameCore {
    fn init(&self) {
        let remote = &self.collab.remote_logger;
        remote.set_tag("game", &TITLE.to_lowercase());
        remote.set_tag("game version", self.collab.server.version());

        self.register_version_command();
        self.register_messages();
        self.bootstrap_permissions();
    }

    fn on_plugin_loaded(&self, plugin: &PluginHandle) {
        if self.gate.on_plugin_loaded(plugin) {
            self.hooks().emit_caught_up(&plugin.name());
            self.record_catch_up();
        }
    }

    fn on_server_initialized(&self) -> bool {
        if !self.gate.open() {
            return false;
        }
        self.hooks().emit_server_initialized();
        self.record_broadcast();

        let server = &self.collab.server;
        tracing::info!(
            "{} core version {} running on {} server version {} (protocol {})",
            TITLE,
            crate::VERSION,
            server.game_name(),
            server.version(),
            server.protocol()
        );

        if let Err(err) = self.collab.analytics.collect() {
            self.report_failure("Analytics collection", &err);
        }

        if !self.config.modded {
            tracing::warn!(
                "The server is currently listed under Community. Only admin tools that do not \
                 affect gameplay or make the server appear modded are allowed under the Community section"
            );
        }

        true
    }

    fn on_server_save(&self) {
        if let Err(err) = self.collab.host.on_save() {
            self.report_failure("Save", &err);
        }
        if let Err(err) = self.collab.host.save_player_data() {
            self.report_failure("Saving player data", &err);
        }
        self.hooks().emit_saved();
    }

    fn on_server_shutdown(&self) {
        if let Err(err) = self.collab.host.on_shutdown() {
            self.report_failure("Shutdown", &err);
        }
        if let Err(err) = self.collab.host.save_player_data() {
            self.report_failure("Saving player data", &err);
        }
        self.hooks().emit_shut_down();
    }
}

impl std::fmt::Debug for GameCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameCore")
            .field("config", &self.config)
            .field("bootstrap", &self.bootstrap.state())
            .field("server_initialized", &self.gate.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::command::testing::TestCaller;
    use crate::command::CommandTable;
    use crate::error::{Error, Result};
    use crate::hook::{Value, ON_SERVER_INITIALIZED};
    use crate::host::BuildInfo;
    use crate::localization::MemoryLocalizationStore;
    use crate::permission::MemoryPermissionStore;
    use crate::plugin::testing::{handle, RecordingPlugin};
    use crate::registry::PluginRegistry;

    #[derive(Default)]
    struct Recorder {
        tags: Mutex<Vec<(String, String)>>,
        collected: AtomicUsize,
        saves: AtomicUsize,
        player_saves: AtomicUsize,
        shutdowns: AtomicUsize,
        fail: bool,
    }

    impl RemoteLogger for Recorder {
        fn set_tag(&self, key: &str, value: &str) {
            self.tags.lock().push((key.to_string(), value.to_string()));
        }
    }

    impl Analytics for Recorder {
        fn collect(&self) -> Result<()> {
            self.collected.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(Error::collaborator("analytics endpoint unreachable"));
            }
            Ok(())
        }
    }

    impl HostServices for Recorder {
        fn on_save(&self) -> Result<()> {
            self.saves.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(Error::collaborator("disk full"));
            }
            Ok(())
        }

        fn on_shutdown(&self) -> Result<()> {
            self.shutdowns.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn save_player_data(&self) -> Result<()> {
            self.player_saves.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    struct Fixture {
        registry: Arc<PluginRegistry>,
        permission: Arc<MemoryPermissionStore>,
        localization: Arc<MemoryLocalizationStore>,
        commands: Arc<CommandTable>,
        recorder: Arc<Recorder>,
        core: GameCore,
    }

    fn fixture(config: CoreConfig, fail: bool) -> Fixture {
        let registry = Arc::new(PluginRegistry::default_config());
        let permission = Arc::new(MemoryPermissionStore::new());
        let localization = Arc::new(MemoryLocalizationStore::new());
        let server = Arc::new(BuildInfo {
            version: "2590".into(),
            protocol: "2590.262.1".into(),
            ..BuildInfo::default()
        });
        let commands = Arc::new(CommandTable::new(server.clone()));
        let recorder = Arc::new(Recorder {
            fail,
            ..Recorder::default()
        });

        let collab = Collaborators::new(
            permission.clone(),
            localization.clone(),
            server,
            commands.clone(),
        )
        .with_host(recorder.clone())
        .with_remote_logger(recorder.clone())
        .with_analytics(recorder.clone());

        let core = GameCore::new(config, registry.clone(), collab);

        Fixture {
            registry,
            permission,
            localization,
            commands,
            recorder,
            core,
        }
    }

    #[test]
    fn test_init_wires_everything() {
        let f = fixture(CoreConfig::new().with_default_groups(["admin", "default"]), false);

        f.core.init();

        assert_eq!(
            *f.recorder.tags.lock(),
            vec![
                ("game".to_string(), "rust".to_string()),
                ("game version".to_string(), "2590".to_string()),
            ]
        );
        assert!(f.commands.contains(VERSION_COMMAND));
        assert_eq!(f.localization.languages(TITLE), vec!["de", "en", "fr"]);
        assert_eq!(f.permission.group("admin").unwrap().rank, 0);
        assert_eq!(f.permission.group("default").unwrap().rank, 1);
        assert!(f.permission.has_validator());
        assert_eq!(f.core.bootstrap_state(), BootstrapState::Ready);
    }

    #[test]
    fn test_init_with_permission_disabled() {
        let f = fixture(CoreConfig::default(), false);
        f.permission.set_loaded(false);

        f.core.init();

        assert!(f.permission.groups().is_empty());
        assert!(!f.permission.has_validator());
        assert_eq!(f.core.bootstrap_state(), BootstrapState::Uninitialized);
        // Everything else still happened.
        assert!(f.commands.contains(VERSION_COMMAND));
    }

    #[test]
    fn test_server_initialized_fires_once() {
        let f = fixture(CoreConfig::default(), false);
        let plugin = RecordingPlugin::new("early");
        f.registry.register(handle(&plugin)).unwrap();

        assert!(f.core.on_server_initialized());
        assert!(!f.core.on_server_initialized());

        assert!(f.core.is_server_initialized());
        assert_eq!(plugin.calls_to(ON_SERVER_INITIALIZED).len(), 1);
        assert_eq!(f.recorder.collected.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_analytics_failure_does_not_revert() {
        let f = fixture(CoreConfig::default(), true);

        assert!(f.core.on_server_initialized());
        assert!(f.core.is_server_initialized());
        assert!(!f.core.on_server_initialized());
    }

    #[test]
    fn test_late_plugin_caught_up() {
        let f = fixture(CoreConfig::default(), false);
        let caught_up = Arc::new(Mutex::new(Vec::new()));
        let seen = caught_up.clone();
        f.core.on_event(move |event| {
            if let LifecycleEvent::CaughtUp { plugin, .. } = event {
                seen.lock().push(plugin.clone());
            }
        });

        let early = RecordingPlugin::new("early");
        f.core.on_plugin_loaded(&handle(&early));
        assert!(caught_up.lock().is_empty());

        f.core.on_server_initialized();
        let late = RecordingPlugin::new("late");
        f.core.on_plugin_loaded(&handle(&late));

        assert_eq!(*caught_up.lock(), vec!["late"]);
        assert_eq!(
            late.calls_to(ON_SERVER_INITIALIZED),
            vec![vec![Value::Bool(false)]]
        );
    }

    #[test]
    fn test_event_handler_can_subscribe() {
        let f = fixture(CoreConfig::default(), false);
        let core = Arc::new(f.core);
        let weak = Arc::downgrade(&core);
        let saves = Arc::new(AtomicUsize::new(0));
        let counter = saves.clone();
        core.on_event(move |event| {
            if let (LifecycleEvent::Saved { .. }, Some(core)) = (event, weak.upgrade()) {
                let counter = counter.clone();
                core.on_event(move |_| {
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
        });

        core.on_server_save();
        assert_eq!(saves.load(Ordering::Relaxed), 0);
        core.on_server_shutdown();
        assert_eq!(saves.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_save_and_shutdown_delegate() {
        let f = fixture(CoreConfig::default(), true);

        f.core.on_server_save();
        f.core.on_server_shutdown();

        // A failed save still persists player data.
        assert_eq!(f.recorder.saves.load(Ordering::Relaxed), 1);
        assert_eq!(f.recorder.shutdowns.load(Ordering::Relaxed), 1);
        assert_eq!(f.recorder.player_saves.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_registered_version_command() {
        let f = fixture(CoreConfig::default(), false);
        f.core.init();

        let console = TestCaller::console();
        f.commands.execute(&console, VERSION_COMMAND, &[]).unwrap();
        let player = TestCaller::player();
        f.core.version(&player, &[]);

        assert!(console.replies.lock()[0].contains("Protocol: 2590.262.1"));
        assert!(console.replies.lock()[0].ends_with(&format!("Rust Core Version: {}", crate::VERSION)));
        assert_eq!(
            *player.replies.lock(),
            vec!["Server is running Rust version 2590"]
        );
    }

    #[cfg(feature = "metrics-prometheus")]
    #[test]
    fn test_metrics_are_recorded() {
        use crate::metrics::MetricsConfig;

        let metrics = Arc::new(CoreMetrics::new(MetricsConfig::default()).unwrap());
        let f = fixture(CoreConfig::default(), true);
        let core = f.core.with_metrics(metrics.clone());

        core.init();
        core.on_server_initialized();
        core.on_plugin_loaded(&handle(&RecordingPlugin::new("late")));

        assert_eq!(metrics.groups_created_total(), 2);
        assert_eq!(metrics.broadcasts_total(), 1);
        assert_eq!(metrics.catch_ups_total(), 1);
        assert_eq!(metrics.collaborator_errors_total(), 1);
    }
}
