// Host metrics via sysinfo. Blocking refreshes run on the blocking pool behind
// per-resource mutexes so the fast and detail tiers can share one probe.

use super::{HostProbe, command, linux};
use crate::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use sysinfo::{Components, Disks, Networks, ProcessesToUpdate, System, Users};
use tracing::instrument;

type Shared<T> = Arc<Mutex<T>>;

/// Component labels that identify the CPU package sensor across drivers.
const CPU_SENSOR_LABELS: &[&str] = &["cpu", "package", "tctl", "coretemp"];

pub struct SysinfoProbe {
    sys: Shared<System>,
    disks: Shared<Disks>,
    networks: Shared<Networks>,
    components: Shared<Components>,
    users: Shared<Users>,
    /// Previous cumulative (rx, tx) per interface, for per-second rates.
    last_network: Shared<Option<(HashMap<String, (u64, u64)>, Instant)>>,
    last_cpu_refresh: Shared<Option<(Instant, LoadStats)>>,
    /// When `new()` refreshed the CPUs; the first load reading is a delta from here.
    cpu_baseline: Instant,
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn shared<T>(v: T) -> Shared<T> {
    Arc::new(Mutex::new(v))
}

fn lock<T>(m: &Mutex<T>) -> anyhow::Result<std::sync::MutexGuard<'_, T>> {
    m.lock()
        .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))
}

async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
}

fn percent(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// How long to wait before a CPU refresh `elapsed` after the previous one yields
/// a meaningful delta.
fn baseline_wait(elapsed: Duration) -> Option<Duration> {
    sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
        .checked_sub(elapsed)
        .filter(|wait| !wait.is_zero())
}

fn cpu_usage(sys: &mut System) -> (f64, Vec<f64>) {
    sys.refresh_cpu_all();
    (
        sys.global_cpu_usage() as f64,
        sys.cpus().iter().map(|c| c.cpu_usage() as f64).collect(),
    )
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys: shared(sys),
            disks: shared(Disks::new_with_refreshed_list()),
            networks: shared(Networks::new_with_refreshed_list()),
            components: shared(Components::new_with_refreshed_list()),
            users: shared(Users::new_with_refreshed_list()),
            last_network: shared(None),
            last_cpu_refresh: shared(None),
            cpu_baseline: Instant::now(),
        }
    }
}

impl HostProbe for SysinfoProbe {
    #[instrument(skip(self), fields(probe = "load"))]
    async fn load(&self) -> anyhow::Result<LoadStats> {
        let sys = self.sys.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        let cpu_baseline = self.cpu_baseline;
        blocking(move || {
            let mut guard = lock(&last_cpu_refresh)?;
            if guard.is_none() {
                // First reading is a delta from the refresh done in new().
                if let Some(wait) = baseline_wait(cpu_baseline.elapsed()) {
                    std::thread::sleep(wait);
                }
            }
            let mut sys = lock(&sys)?;
            let now = Instant::now();
            let avg = System::load_average();

            let (current_load, cpus) = match guard.as_ref() {
                Some((prev_ts, prev))
                    if now.duration_since(*prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL =>
                {
                    // Too soon for a meaningful delta; reuse the previous reading.
                    (prev.current_load, prev.cpus.clone())
                }
                _ => cpu_usage(&mut sys),
            };

            let stats = LoadStats {
                current_load: current_load.clamp(0.0, 100.0),
                avg_load_1: avg.one,
                avg_load_5: avg.five,
                avg_load_15: avg.fifteen,
                cpus,
            };
            *guard = Some((now, stats.clone()));
            Ok(stats)
        })
        .await
    }

    #[instrument(skip(self), fields(probe = "memory"))]
    async fn memory(&self) -> anyhow::Result<MemoryStats> {
        let sys = self.sys.clone();
        blocking(move || {
            let mut sys = lock(&sys)?;
            sys.refresh_memory();
            let total = sys.total_memory();
            let available = sys.available_memory();
            Ok(MemoryStats {
                total,
                free: sys.free_memory(),
                used: sys.used_memory(),
                active: total.saturating_sub(available),
                available,
                swap_total: sys.total_swap(),
                swap_used: sys.used_swap(),
            })
        })
        .await
    }

    #[instrument(skip(self), fields(probe = "network"))]
    async fn network(&self) -> anyhow::Result<Vec<InterfaceThroughput>> {
        let networks = self.networks.clone();
        let last_network = self.last_network.clone();
        blocking(move || {
            let mut networks = lock(&networks)?;
            networks.refresh(true);
            let mut interfaces: Vec<InterfaceThroughput> = networks
                .list()
                .iter()
                .map(|(name, data)| InterfaceThroughput {
                    iface: name.clone(),
                    operstate: linux::interface_operstate(name),
                    internal: name == "lo",
                    rx_bytes: data.total_received(),
                    tx_bytes: data.total_transmitted(),
                    rx_sec: 0.0,
                    tx_sec: 0.0,
                    speed: linux::interface_speed(name),
                })
                .collect();
            interfaces.sort_by(|a, b| a.iface.cmp(&b.iface));

            let now = Instant::now();
            let mut guard = lock(&last_network)?;
            if let Some((prev, prev_ts)) = guard.as_ref() {
                let dt_secs = now.duration_since(*prev_ts).as_secs_f64();
                if dt_secs > 0.0 {
                    for iface in &mut interfaces {
                        if let Some((prx, ptx)) = prev.get(&iface.iface) {
                            iface.rx_sec = iface.rx_bytes.saturating_sub(*prx) as f64 / dt_secs;
                            iface.tx_sec = iface.tx_bytes.saturating_sub(*ptx) as f64 / dt_secs;
                        }
                    }
                }
            }
            let totals = interfaces
                .iter()
                .map(|i| (i.iface.clone(), (i.rx_bytes, i.tx_bytes)))
                .collect();
            *guard = Some((totals, now));

            Ok(interfaces)
        })
        .await
    }

    async fn uptime(&self) -> anyhow::Result<u64> {
        Ok(System::uptime())
    }

    #[instrument(skip(self), fields(probe = "cpu"))]
    async fn cpu_info(&self) -> anyhow::Result<CpuInfo> {
        let sys = self.sys.clone();
        blocking(move || {
            let sys = lock(&sys)?;
            let first = sys.cpus().first();
            let brand = linux::read_cpu_model()
                .or_else(|| {
                    first
                        .map(|c| c.brand().trim().to_string())
                        .filter(|s| !s.is_empty())
                })
                .unwrap_or_else(|| "Unknown".into());
            Ok(CpuInfo {
                manufacturer: first.map(|c| c.vendor_id().to_string()).unwrap_or_default(),
                brand,
                speed_mhz: first.map(|c| c.frequency()).unwrap_or(0),
                physical_cores: System::physical_core_count().unwrap_or(0) as u32,
                cores: sys.cpus().len() as u32,
            })
        })
        .await
    }

    #[instrument(skip(self), fields(probe = "os"))]
    async fn os_info(&self) -> anyhow::Result<OsInfo> {
        blocking(|| {
            let platform = System::name().unwrap_or_else(|| std::env::consts::OS.into());
            Ok(OsInfo {
                distro: linux::read_distro().unwrap_or_else(|| platform.clone()),
                platform,
                release: System::os_version().unwrap_or_default(),
                kernel: System::kernel_version().unwrap_or_default(),
                arch: std::env::consts::ARCH.to_string(),
                hostname: System::host_name().unwrap_or_default(),
            })
        })
        .await
    }

    #[instrument(skip(self), fields(probe = "filesystems"))]
    async fn filesystems(&self) -> anyhow::Result<Vec<Filesystem>> {
        let disks = self.disks.clone();
        blocking(move || {
            let mut disks = lock(&disks)?;
            disks.refresh(true);
            Ok(disks
                .list()
                .iter()
                .map(|d| {
                    let size = d.total_space();
                    let available = d.available_space();
                    let used = size.saturating_sub(available);
                    Filesystem {
                        fs: d.name().to_string_lossy().into_owned(),
                        type_: d.file_system().to_string_lossy().into_owned(),
                        size,
                        used,
                        available,
                        use_percent: percent(used, size),
                        mount: d.mount_point().to_string_lossy().into_owned(),
                    }
                })
                .collect())
        })
        .await
    }

    #[instrument(skip(self), fields(probe = "temperature"))]
    async fn temperature(&self) -> anyhow::Result<Temperature> {
        let components = self.components.clone();
        blocking(move || {
            let mut components = lock(&components)?;
            components.refresh(true);
            let readings: Vec<(String, f64)> = components
                .list()
                .iter()
                .filter_map(|c| Some((c.label().to_lowercase(), c.temperature()? as f64)))
                .filter(|(_, t)| t.is_finite())
                .collect();
            let cores: Vec<f64> = readings
                .iter()
                .filter(|(label, _)| label.contains("core"))
                .map(|(_, t)| *t)
                .collect();
            let cpu_main = readings
                .iter()
                .filter(|(label, _)| CPU_SENSOR_LABELS.iter().any(|k| label.contains(*k)))
                .map(|(_, t)| *t)
                .reduce(f64::max);
            let max = readings.iter().map(|(_, t)| *t).reduce(f64::max);
            Ok(Temperature {
                main: cpu_main.or(max),
                max,
                cores,
            })
        })
        .await
    }

    #[instrument(skip(self), fields(probe = "diskLayout"))]
    async fn disk_layout(&self) -> anyhow::Result<Vec<PhysicalDisk>> {
        blocking(linux::read_block_devices).await
    }

    #[instrument(skip(self), fields(probe = "processes"))]
    async fn processes(&self) -> anyhow::Result<Vec<ProcessRecord>> {
        let sys = self.sys.clone();
        let users = self.users.clone();
        blocking(move || {
            let mut sys = lock(&sys)?;
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let users = lock(&users)?;
            let total = sys.total_memory();
            Ok(sys
                .processes()
                .values()
                .map(|p| ProcessRecord {
                    pid: p.pid().as_u32(),
                    name: p.name().to_string_lossy().into_owned(),
                    cpu: p.cpu_usage() as f64,
                    mem: percent(p.memory(), total),
                    mem_rss: p.memory(),
                    user: p
                        .user_id()
                        .and_then(|uid| users.get_user_by_id(uid))
                        .map(|u| u.name().to_string())
                        .unwrap_or_default(),
                    state: p.status().to_string(),
                })
                .collect())
        })
        .await
    }

    async fn users(&self) -> anyhow::Result<Vec<UserSession>> {
        command::users().await
    }

    async fn services(&self, names: &[String]) -> anyhow::Result<Vec<ServiceState>> {
        command::services(names).await
    }

    async fn connections(&self) -> anyhow::Result<Vec<Connection>> {
        command::connections().await
    }
}
