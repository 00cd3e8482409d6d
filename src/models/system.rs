// CPU load, memory, CPU identity, OS identity and temperature models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    /// Global CPU usage in percent (0-100).
    pub current_load: f64,
    pub avg_load_1: f64,
    pub avg_load_5: f64,
    pub avg_load_15: f64,
    /// Per-core usage in percent, in core order.
    pub cpus: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    /// Memory actively in use by processes (total minus available).
    pub active: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

impl MemoryStats {
    /// `active / total * 100`, or 0 when total is zero.
    pub fn active_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.active as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub manufacturer: String,
    pub brand: String,
    pub speed_mhz: u64,
    pub physical_cores: u32,
    pub cores: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsInfo {
    pub platform: String,
    pub distro: String,
    pub release: String,
    pub kernel: String,
    pub arch: String,
    pub hostname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    pub main: Option<f64>,
    pub max: Option<f64>,
    pub cores: Vec<f64>,
}
