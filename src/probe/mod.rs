// Probe Set: one async call per metric family, each an isolated unit of failure.
// Tiers reach the host and the container runtime only through these traits.

mod command;
pub mod docker;
mod host;
mod linux;

pub use command::{parse_ss, parse_who};
pub use docker::DockerProbe;
pub use host::SysinfoProbe;

use crate::models::*;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe {probe} failed: {message}")]
    Failed { probe: &'static str, message: String },
    #[error("probe {probe} timed out after {timeout_ms} ms")]
    TimedOut { probe: &'static str, timeout_ms: u64 },
}

impl ProbeError {
    pub fn probe(&self) -> &'static str {
        match self {
            ProbeError::Failed { probe, .. } | ProbeError::TimedOut { probe, .. } => probe,
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// OS metric sources.
pub trait HostProbe: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = anyhow::Result<LoadStats>> + Send;
    fn memory(&self) -> impl Future<Output = anyhow::Result<MemoryStats>> + Send;
    fn network(&self) -> impl Future<Output = anyhow::Result<Vec<InterfaceThroughput>>> + Send;
    fn uptime(&self) -> impl Future<Output = anyhow::Result<u64>> + Send;
    fn cpu_info(&self) -> impl Future<Output = anyhow::Result<CpuInfo>> + Send;
    fn os_info(&self) -> impl Future<Output = anyhow::Result<OsInfo>> + Send;
    fn filesystems(&self) -> impl Future<Output = anyhow::Result<Vec<Filesystem>>> + Send;
    fn temperature(&self) -> impl Future<Output = anyhow::Result<Temperature>> + Send;
    fn disk_layout(&self) -> impl Future<Output = anyhow::Result<Vec<PhysicalDisk>>> + Send;
    fn processes(&self) -> impl Future<Output = anyhow::Result<Vec<ProcessRecord>>> + Send;
    fn users(&self) -> impl Future<Output = anyhow::Result<Vec<UserSession>>> + Send;
    fn services(
        &self,
        names: &[String],
    ) -> impl Future<Output = anyhow::Result<Vec<ServiceState>>> + Send;
    fn connections(&self) -> impl Future<Output = anyhow::Result<Vec<Connection>>> + Send;
}

/// Container runtime sources. Inventory and stats come from separate calls and are
/// only loosely keyed by container id.
pub trait ContainerProbe: Send + Sync + 'static {
    fn containers(&self) -> impl Future<Output = anyhow::Result<Vec<ContainerRecord>>> + Send;
    fn container_stats(&self) -> impl Future<Output = anyhow::Result<Vec<StatSample>>> + Send;
}

/// A missing runtime connection turns both container probes into failures.
impl<C: ContainerProbe> ContainerProbe for Option<C> {
    async fn containers(&self) -> anyhow::Result<Vec<ContainerRecord>> {
        match self {
            Some(probe) => probe.containers().await,
            None => anyhow::bail!("container runtime not connected"),
        }
    }

    async fn container_stats(&self) -> anyhow::Result<Vec<StatSample>> {
        match self {
            Some(probe) => probe.container_stats().await,
            None => anyhow::bail!("container runtime not connected"),
        }
    }
}

/// Run one probe to completion (or `timeout`) and contain its failure.
pub async fn settle<T, F>(probe: &'static str, timeout: Duration, fut: F) -> ProbeResult<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::warn!(probe, error = %e, "probe failed");
            Err(ProbeError::Failed {
                probe,
                message: format!("{:#}", e),
            })
        }
        Err(_) => {
            let timeout_ms = timeout.as_millis() as u64;
            tracing::warn!(probe, timeout_ms, "probe timed out");
            Err(ProbeError::TimedOut { probe, timeout_ms })
        }
    }
}
