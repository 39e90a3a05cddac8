//! Prometheus metrics integration for the core plugin.

use prometheus::{Counter, Registry};

/// Configuration for core plugin metrics collection.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Metric prefix for all core plugin metrics.
    pub prefix: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prefix: "rust_server_core".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metric prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// Core plugin metrics collector.
pub struct CoreMetrics {
    config: MetricsConfig,
    registry: Registry,
    broadcasts: Counter,
    catch_ups: Counter,
    groups_created: Counter,
    collaborator_errors: Counter,
}

fn counter(registry: &Registry, name: String, help: &str) -> prometheus::Result<Counter> {
    let counter = Counter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl CoreMetrics {
    /// Create a new metrics collector with the given configuration.
    pub fn new(config: MetricsConfig) -> prometheus::Result<Self> {
        let registry = Registry::new();
        let prefix = &config.prefix;

        let broadcasts = counter(
            &registry,
            format!("{}_server_initialized_broadcasts_total", prefix),
            "Server initialized broadcasts sent",
        )?;
        let catch_ups = counter(
            &registry,
            format!("{}_catch_up_notifications_total", prefix),
            "Server initialized notifications delivered to late plugins",
        )?;
        let groups_created = counter(
            &registry,
            format!("{}_groups_created_total", prefix),
            "Default permission groups created",
        )?;
        let collaborator_errors = counter(
            &registry,
            format!("{}_collaborator_errors_total", prefix),
            "Failures reported by host collaborators",
        )?;

        Ok(Self {
            config,
            registry,
            broadcasts,
            catch_ups,
            groups_created,
            collaborator_errors,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Get the Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the server initialized broadcast.
    pub fn record_broadcast(&self) {
        self.broadcasts.inc();
    }

    /// Record a catch-up notification.
    pub fn record_catch_up(&self) {
        self.catch_ups.inc();
    }

    /// Record created groups.
    pub fn record_groups_created(&self, count: usize) {
        self.groups_created.inc_by(count as f64);
    }

    /// Record a collaborator failure.
    pub fn record_collaborator_error(&self) {
        self.collaborator_errors.inc();
    }

    /// Total broadcasts.
    pub fn broadcasts_total(&self) -> u64 {
        self.broadcasts.get() as u64
    }

    /// Total catch-up notifications.
    pub fn catch_ups_total(&self) -> u64 {
        self.catch_ups.get() as u64
    }

    /// Total groups created.
    pub fn groups_created_total(&self) -> u64 {
        self.groups_created.get() as u64
    }

    /// Total collaborator failures.
    pub fn collaborator_errors_total(&self) -> u64 {
        self.collaborator_errors.get() as u64
    }
}

impl std::fmt::Debug for CoreMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreMetrics")
            .field("config", &self.config)
            .field("broadcasts", &self.broadcasts_total())
            .field("catch_ups", &self.catch_ups_total())
            .field("groups_created", &self.groups_created_total())
            .finish()
    }
}
