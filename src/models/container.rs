// Docker container models: raw inventory, raw stat samples and the reconciled view

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Docker container state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Exited,
    Paused,
    Restarting,
    Removing,
    Dead,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub public_port: Option<u16>,
    pub private_port: u16,
    #[serde(rename = "type")]
    pub protocol: String,
}

/// One entry of the container inventory. `id` may be a truncated prefix of the runtime id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    pub image: String,
    pub command: String,
    pub state: ContainerState,
    pub ports: Vec<PortMapping>,
}

/// Raw resource sample as delivered by the stats source. Field names are not stable
/// across sources (`cpuPercent` vs `cpu_percent`, `netIO.tx` vs `netIO.wx`), so the
/// payload is kept untyped until the reconciler normalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSample {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StatSample {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Resolve a dotted path (e.g. "netIO.rx") to a number, if present.
    pub fn number_at(&self, path: &str) -> Option<f64> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        current.as_f64()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetIo {
    pub rx: f64,
    pub tx: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockIo {
    pub r: f64,
    pub w: f64,
}

/// Normalized container usage; all zero when no sample matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerUsage {
    pub cpu: f64,
    pub mem: f64,
    pub mem_limit: f64,
    #[serde(rename = "netIO")]
    pub net_io: NetIo,
    #[serde(rename = "blockIO")]
    pub block_io: BlockIo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedContainer {
    #[serde(flatten)]
    pub record: ContainerRecord,
    pub stats: ContainerUsage,
}
