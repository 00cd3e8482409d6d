// Domain models shared by the probes, the tiers and the request layer

mod container;
mod network;
mod process;
mod snapshot;
mod storage;
mod system;

pub use container::{
    BlockIo, ContainerRecord, ContainerState, ContainerUsage, NetIo, PortMapping, StatSample,
    UnifiedContainer,
};
pub use network::{Connection, ConnectionState, InterfaceThroughput};
pub use process::{ProcessRecord, ServiceState, UserSession};
pub use snapshot::{DetailSnapshot, FastSnapshot, HistoryPoint};
pub use storage::{Filesystem, MountPartition, PhysicalDisk};
pub use system::{CpuInfo, LoadStats, MemoryStats, OsInfo, Temperature};
