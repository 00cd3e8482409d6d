// Tier snapshots and history points

use serde::{Deserialize, Serialize};

use super::{
    Connection, CpuInfo, Filesystem, InterfaceThroughput, LoadStats, MemoryStats,
    MountPartition, OsInfo, PhysicalDisk, ProcessRecord, ServiceState, Temperature,
    UnifiedContainer, UserSession,
};

/// High-frequency gauges. `failed_probes` names every probe that fell back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastSnapshot {
    pub timestamp: u64,
    pub load: LoadStats,
    pub memory: MemoryStats,
    pub network: Vec<InterfaceThroughput>,
    pub uptime_seconds: u64,
    pub failed_probes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSnapshot {
    pub timestamp: u64,
    pub cpu_info: CpuInfo,
    pub os_info: OsInfo,
    pub filesystems: Vec<Filesystem>,
    pub mounts: MountPartition,
    pub temperature: Option<Temperature>,
    pub containers: Vec<UnifiedContainer>,
    pub services: Vec<ServiceState>,
    pub top_processes: Vec<ProcessRecord>,
    pub users: Vec<UserSession>,
    pub disk_layout: Vec<PhysicalDisk>,
    /// Raw connection list is not kept; only the count of established ones.
    pub connection_count: u64,
    pub failed_probes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// Unix seconds.
    pub timestamp: i64,
    /// Local wall-clock label, "HH:MM:SS".
    pub label: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}
