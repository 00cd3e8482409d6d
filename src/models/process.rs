// Process, login session and service models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// CPU usage in percent of one core.
    pub cpu: f64,
    /// Resident memory in percent of total memory.
    pub mem: f64,
    pub mem_rss: u64,
    pub user: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user: String,
    pub tty: String,
    pub date: String,
    pub time: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceState {
    pub name: String,
    pub running: bool,
}
