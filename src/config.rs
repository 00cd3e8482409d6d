use crate::derive::{DEFAULT_EPHEMERAL_MOUNTS, DEFAULT_OVERLAY_PREFIX, MountRules};
use crate::tier::AggregatorConfig;
use crate::worker::PollerConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub probes: ProbesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub fast_interval_ms: u64,
    pub detail_interval_ms: u64,
    /// A probe running longer than this counts as failed for that poll.
    pub probe_timeout_ms: u64,
    /// How often to log poller stats at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fast_interval_ms: 2_000,
            detail_interval_ms: 10_000,
            probe_timeout_ms: 5_000,
            stats_log_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::history::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    /// Max number of fast snapshots buffered for /ws/stats (slow clients may lag).
    pub broadcast_capacity: usize,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbesConfig {
    /// systemd units reported in the detail snapshot.
    pub services: Vec<String>,
    /// Mount roots listed as RAM-backed / ephemeral rather than physical.
    pub ephemeral_mounts: Vec<String>,
    pub overlay_prefix: String,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        let defaults = AggregatorConfig::default();
        Self {
            services: defaults.services,
            ephemeral_mounts: DEFAULT_EPHEMERAL_MOUNTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            overlay_prefix: DEFAULT_OVERLAY_PREFIX.to_string(),
        }
    }
}

/// Absolute and not `/` itself; `/` would swallow every mount.
fn is_mount_root(path: &str) -> bool {
    path.starts_with('/') && !path.trim_end_matches('/').is_empty()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            probe_timeout: std::time::Duration::from_millis(self.polling.probe_timeout_ms),
            services: self.probes.services.clone(),
            mounts: MountRules {
                ephemeral_roots: self.probes.ephemeral_mounts.clone(),
                overlay_prefix: self.probes.overlay_prefix.clone(),
            },
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            fast_interval_ms: self.polling.fast_interval_ms,
            detail_interval_ms: self.polling.detail_interval_ms,
            stats_log_interval_secs: self.polling.stats_log_interval_secs,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.polling.fast_interval_ms > 0,
            "polling.fast_interval_ms must be > 0, got {}",
            self.polling.fast_interval_ms
        );
        anyhow::ensure!(
            self.polling.detail_interval_ms > 0,
            "polling.detail_interval_ms must be > 0, got {}",
            self.polling.detail_interval_ms
        );
        anyhow::ensure!(
            self.polling.probe_timeout_ms > 0,
            "polling.probe_timeout_ms must be > 0, got {}",
            self.polling.probe_timeout_ms
        );
        anyhow::ensure!(
            self.polling.stats_log_interval_secs > 0,
            "polling.stats_log_interval_secs must be > 0, got {}",
            self.polling.stats_log_interval_secs
        );
        anyhow::ensure!(
            (1..=crate::history::DEFAULT_CAPACITY).contains(&self.history.capacity),
            "history.capacity must be between 1 and {}, got {}",
            crate::history::DEFAULT_CAPACITY,
            self.history.capacity
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        for mount in &self.probes.ephemeral_mounts {
            anyhow::ensure!(
                is_mount_root(mount),
                "probes.ephemeral_mounts entries must be absolute paths other than /, got {:?}",
                mount
            );
        }
        anyhow::ensure!(
            is_mount_root(&self.probes.overlay_prefix),
            "probes.overlay_prefix must be an absolute path other than /, got {:?}",
            self.probes.overlay_prefix
        );
        Ok(())
    }
}
