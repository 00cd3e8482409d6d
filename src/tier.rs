// Fast and detail tier aggregation. Each tier fans out to its probes concurrently,
// waits for all of them to settle and assembles the snapshot positionally.

use crate::derive::{self, MountRules};
use crate::models::{DetailSnapshot, FastSnapshot};
use crate::probe::{ContainerProbe, HostProbe, ProbeResult, settle};
use crate::reconcile;
use std::fmt;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Fast,
    Detail,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Fast => f.write_str("fast"),
            Tier::Detail => f.write_str("detail"),
        }
    }
}

/// Tier-wide failures. Single probe failures never show up here.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TierError {
    #[error("a {0} tier poll is already in flight")]
    InFlight(Tier),
    #[error("no {0} tier snapshot is available yet")]
    Unavailable(Tier),
}

/// Probe-independent knobs for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub probe_timeout: Duration,
    pub services: Vec<String>,
    pub mounts: MountRules,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            services: ["ssh", "docker", "cron", "ufw", "networking"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            mounts: MountRules::default(),
        }
    }
}

/// Collects probe names that fell back to their defaults, in invocation order.
#[derive(Debug, Default)]
struct Degraded(Vec<String>);

impl Degraded {
    fn or_default<T: Default>(&mut self, result: ProbeResult<T>) -> T {
        self.or_else(result, T::default())
    }

    fn or_else<T>(&mut self, result: ProbeResult<T>, default: T) -> T {
        match result {
            Ok(v) => v,
            Err(e) => {
                self.0.push(e.probe().to_string());
                default
            }
        }
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

pub struct Aggregator<H, C> {
    host: H,
    containers: C,
    config: AggregatorConfig,
    fast_permit: Semaphore,
    detail_permit: Semaphore,
}

impl<H: HostProbe, C: ContainerProbe> Aggregator<H, C> {
    pub fn new(host: H, containers: C, config: AggregatorConfig) -> Self {
        Self {
            host,
            containers,
            config,
            fast_permit: Semaphore::new(1),
            detail_permit: Semaphore::new(1),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Load, memory, network throughput and uptime.
    pub async fn fast_snapshot(&self) -> Result<FastSnapshot, TierError> {
        let _permit = self
            .fast_permit
            .try_acquire()
            .map_err(|_| TierError::InFlight(Tier::Fast))?;
        let t = self.config.probe_timeout;

        let (load, memory, network, uptime) = tokio::join!(
            settle("load", t, self.host.load()),
            settle("memory", t, self.host.memory()),
            settle("network", t, self.host.network()),
            settle("uptime", t, self.host.uptime()),
        );

        let mut degraded = Degraded::default();
        Ok(FastSnapshot {
            timestamp: now_millis(),
            load: degraded.or_default(load),
            memory: degraded.or_default(memory),
            network: degraded.or_default(network),
            uptime_seconds: degraded.or_default(uptime),
            failed_probes: degraded.0,
        })
    }

    /// Everything slower: identity, disks, containers with stats, services, processes,
    /// sessions and connections.
    pub async fn detail_snapshot(&self) -> Result<DetailSnapshot, TierError> {
        let _permit = self
            .detail_permit
            .try_acquire()
            .map_err(|_| TierError::InFlight(Tier::Detail))?;
        let t = self.config.probe_timeout;

        let (
            cpu_info,
            os_info,
            filesystems,
            temperature,
            containers,
            stats,
            services,
            processes,
            users,
            disk_layout,
            connections,
        ) = tokio::join!(
            settle("cpu", t, self.host.cpu_info()),
            settle("os", t, self.host.os_info()),
            settle("filesystems", t, self.host.filesystems()),
            settle("temperature", t, self.host.temperature()),
            settle("containers", t, self.containers.containers()),
            settle("containerStats", t, self.containers.container_stats()),
            settle("services", t, self.host.services(&self.config.services)),
            settle("processes", t, self.host.processes()),
            settle("users", t, self.host.users()),
            settle("diskLayout", t, self.host.disk_layout()),
            settle("connections", t, self.host.connections()),
        );

        let mut degraded = Degraded::default();
        let cpu_info = degraded.or_default(cpu_info);
        let os_info = degraded.or_default(os_info);
        let filesystems = degraded.or_default(filesystems);
        let temperature = degraded.or_else(temperature.map(Some), None);
        let containers = degraded.or_default(containers);
        let stats = degraded.or_default(stats);
        let services = degraded.or_default(services);
        let processes = degraded.or_default(processes);
        let users = degraded.or_default(users);
        let disk_layout = degraded.or_default(disk_layout);
        let connections = degraded.or_default(connections);

        Ok(DetailSnapshot {
            timestamp: now_millis(),
            cpu_info,
            os_info,
            mounts: derive::partition_mounts(&filesystems, &self.config.mounts),
            filesystems,
            temperature,
            containers: reconcile::reconcile(containers, &stats),
            services,
            top_processes: derive::top_processes(processes, derive::TOP_PROCESS_COUNT),
            users,
            disk_layout: derive::physical_disks(disk_layout),
            connection_count: derive::established_count(&connections),
            failed_probes: degraded.0,
        })
    }
}
