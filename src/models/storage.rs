// Filesystem usage and physical disk models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filesystem {
    pub fs: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    #[serde(rename = "use")]
    pub use_percent: f64,
    pub mount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalDisk {
    pub device: String,
    pub name: String,
    pub vendor: String,
    pub size: u64,
    /// "HD", "SSD", "NVMe" or "Virtual".
    #[serde(rename = "type")]
    pub type_: String,
}

/// Filesystems split for display: real disks vs RAM-backed / ephemeral mounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountPartition {
    pub physical: Vec<Filesystem>,
    pub ephemeral: Vec<Filesystem>,
}
