// Shared test helpers: scripted probes with per-probe failure injection

#![allow(dead_code)]

use homedash::models::*;
use homedash::probe::{ContainerProbe, HostProbe};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How a scripted probe behaves when it is listed in `FakeHost::faults`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    Error,
    Hang,
}

#[derive(Default)]
pub struct FakeHost {
    pub failing: HashSet<&'static str>,
    pub hanging: HashSet<&'static str>,
    /// Delay applied to every probe call.
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault(mut self, probe: &'static str, fault: Fault) -> Self {
        match fault {
            Fault::Error => self.failing.insert(probe),
            Fault::Hang => self.hanging.insert(probe),
        };
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn enter(&self, probe: &'static str) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.hanging.contains(probe) {
            std::future::pending::<()>().await;
        }
        anyhow::ensure!(!self.failing.contains(probe), "{} unavailable", probe);
        Ok(())
    }
}

pub fn sample_load() -> LoadStats {
    LoadStats {
        current_load: 42.5,
        avg_load_1: 0.5,
        avg_load_5: 0.4,
        avg_load_15: 0.3,
        cpus: vec![40.0, 45.0],
    }
}

pub fn sample_memory() -> MemoryStats {
    MemoryStats {
        total: 1000,
        free: 200,
        used: 800,
        active: 250,
        available: 750,
        swap_total: 0,
        swap_used: 0,
    }
}

pub fn sample_network() -> Vec<InterfaceThroughput> {
    vec![InterfaceThroughput {
        iface: "eth0".into(),
        operstate: "up".into(),
        internal: false,
        rx_bytes: 1000,
        tx_bytes: 500,
        rx_sec: 10.0,
        tx_sec: 5.0,
        speed: 1_000_000_000,
    }]
}

pub fn sample_filesystems() -> Vec<Filesystem> {
    let fs = |mount: &str, size: u64| Filesystem {
        fs: "/dev/sda1".into(),
        type_: "ext4".into(),
        size,
        used: size / 2,
        available: size / 2,
        use_percent: 50.0,
        mount: mount.into(),
    };
    vec![fs("/", 1000), fs("/tmp", 100), fs("/boot", 0)]
}

pub fn sample_processes() -> Vec<ProcessRecord> {
    [10.0, 90.0, 5.0, 40.0, 60.0, 20.0]
        .iter()
        .enumerate()
        .map(|(i, cpu)| ProcessRecord {
            pid: i as u32 + 1,
            name: format!("proc{}", i + 1),
            cpu: *cpu,
            ..Default::default()
        })
        .collect()
}

pub fn sample_connections() -> Vec<Connection> {
    [
        ConnectionState::Established,
        ConnectionState::Established,
        ConnectionState::Listen,
        ConnectionState::Closed,
    ]
    .into_iter()
    .map(|state| Connection {
        protocol: "tcp".into(),
        local_address: "10.0.0.2:22".into(),
        peer_address: "10.0.0.5:40000".into(),
        state,
    })
    .collect()
}

impl HostProbe for FakeHost {
    async fn load(&self) -> anyhow::Result<LoadStats> {
        self.enter("load").await?;
        Ok(sample_load())
    }

    async fn memory(&self) -> anyhow::Result<MemoryStats> {
        self.enter("memory").await?;
        Ok(sample_memory())
    }

    async fn network(&self) -> anyhow::Result<Vec<InterfaceThroughput>> {
        self.enter("network").await?;
        Ok(sample_network())
    }

    async fn uptime(&self) -> anyhow::Result<u64> {
        self.enter("uptime").await?;
        Ok(3600)
    }

    async fn cpu_info(&self) -> anyhow::Result<CpuInfo> {
        self.enter("cpu").await?;
        Ok(CpuInfo {
            manufacturer: "GenuineIntel".into(),
            brand: "Test CPU".into(),
            speed_mhz: 3000,
            physical_cores: 4,
            cores: 8,
        })
    }

    async fn os_info(&self) -> anyhow::Result<OsInfo> {
        self.enter("os").await?;
        Ok(OsInfo {
            platform: "Linux".into(),
            distro: "Debian GNU/Linux 12".into(),
            ..Default::default()
        })
    }

    async fn filesystems(&self) -> anyhow::Result<Vec<Filesystem>> {
        self.enter("filesystems").await?;
        Ok(sample_filesystems())
    }

    async fn temperature(&self) -> anyhow::Result<Temperature> {
        self.enter("temperature").await?;
        Ok(Temperature {
            main: Some(48.0),
            max: Some(55.0),
            cores: vec![47.0, 48.0],
        })
    }

    async fn disk_layout(&self) -> anyhow::Result<Vec<PhysicalDisk>> {
        self.enter("diskLayout").await?;
        Ok(vec![
            PhysicalDisk {
                device: "/dev/sda".into(),
                size: 500,
                type_: "SSD".into(),
                ..Default::default()
            },
            PhysicalDisk {
                device: "/dev/loop0".into(),
                size: 100,
                type_: "Virtual".into(),
                ..Default::default()
            },
        ])
    }

    async fn processes(&self) -> anyhow::Result<Vec<ProcessRecord>> {
        self.enter("processes").await?;
        Ok(sample_processes())
    }

    async fn users(&self) -> anyhow::Result<Vec<UserSession>> {
        self.enter("users").await?;
        Ok(vec![UserSession {
            user: "alice".into(),
            tty: "pts/0".into(),
            ..Default::default()
        }])
    }

    async fn services(&self, names: &[String]) -> anyhow::Result<Vec<ServiceState>> {
        self.enter("services").await?;
        Ok(names
            .iter()
            .map(|n| ServiceState {
                name: n.clone(),
                running: n == "ssh",
            })
            .collect())
    }

    async fn connections(&self) -> anyhow::Result<Vec<Connection>> {
        self.enter("connections").await?;
        Ok(sample_connections())
    }
}

/// Inventory with full ids; stats keyed by truncated ids in the snake_case convention.
#[derive(Default)]
pub struct FakeContainers {
    pub fail_inventory: bool,
    pub fail_stats: bool,
}

pub fn container(id: &str, name: &str) -> ContainerRecord {
    ContainerRecord {
        id: id.into(),
        name: name.into(),
        image: format!("{}:latest", name),
        command: "run".into(),
        state: ContainerState::Running,
        ports: vec![PortMapping {
            public_port: Some(8080),
            private_port: 80,
            protocol: "tcp".into(),
        }],
    }
}

pub fn stat(id: &str, fields: serde_json::Value) -> StatSample {
    match fields {
        serde_json::Value::Object(map) => StatSample::new(id, map),
        _ => panic!("stat fields must be an object"),
    }
}

impl ContainerProbe for FakeContainers {
    async fn containers(&self) -> anyhow::Result<Vec<ContainerRecord>> {
        anyhow::ensure!(!self.fail_inventory, "docker socket unavailable");
        Ok(vec![
            container("ab12cd34ef56", "web"),
            container("0011223344", "db"),
            container("ffeeddcc", "cache"),
        ])
    }

    async fn container_stats(&self) -> anyhow::Result<Vec<StatSample>> {
        anyhow::ensure!(!self.fail_stats, "stats unavailable");
        Ok(vec![
            stat(
                "ab12cd34",
                json!({ "cpu_percent": 7.0, "mem_usage": 100, "mem_limit": 1000,
                        "netIO": { "rx": 1, "wx": 2 } }),
            ),
            stat(
                "0011223344556677",
                json!({ "cpuPercent": 12.5, "memUsage": 200, "memLimit": 2000,
                        "netIO": { "rx": 3, "tx": 4 }, "blockIO": { "r": 5, "w": 6 } }),
            ),
        ])
    }
}
