// Composite views computed from raw detail-tier probe results.

use crate::models::{
    Connection, ConnectionState, Filesystem, MountPartition, PhysicalDisk, ProcessRecord,
};

pub const TOP_PROCESS_COUNT: usize = 5;

/// Mount roots that are RAM-backed or ephemeral on a typical host.
pub const DEFAULT_EPHEMERAL_MOUNTS: &[&str] = &["/mnt/ramdisk", "/var/log", "/tmp", "/run"];

/// Docker overlay mounts duplicate the backing filesystem and are not shown as disks.
pub const DEFAULT_OVERLAY_PREFIX: &str = "/var/lib/docker/overlay2";

/// Top `n` processes by CPU, descending. Ties keep input order.
pub fn top_processes(mut processes: Vec<ProcessRecord>, n: usize) -> Vec<ProcessRecord> {
    // sort_by is stable
    processes.sort_by(|a, b| b.cpu.total_cmp(&a.cpu));
    processes.truncate(n);
    processes
}

/// Number of connections in the ESTABLISHED state.
pub fn established_count(connections: &[Connection]) -> u64 {
    connections
        .iter()
        .filter(|c| c.state == ConnectionState::Established)
        .count() as u64
}

/// `mount` equals `root` or lies beneath it. A root of `/` only matches `/`.
fn is_under(mount: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return mount == "/";
    }
    mount == root
        || mount
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Settings for splitting filesystems into physical and ephemeral mounts.
#[derive(Debug, Clone)]
pub struct MountRules {
    pub ephemeral_roots: Vec<String>,
    pub overlay_prefix: String,
}

impl Default for MountRules {
    fn default() -> Self {
        Self {
            ephemeral_roots: DEFAULT_EPHEMERAL_MOUNTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            overlay_prefix: DEFAULT_OVERLAY_PREFIX.to_string(),
        }
    }
}

/// Split filesystems into physical and ephemeral mounts. Zero-size entries go nowhere.
/// An ephemeral mount is never also listed as physical.
pub fn partition_mounts(filesystems: &[Filesystem], rules: &MountRules) -> MountPartition {
    let mut out = MountPartition::default();
    for fs in filesystems.iter().filter(|fs| fs.size > 0) {
        if rules
            .ephemeral_roots
            .iter()
            .any(|root| is_under(&fs.mount, root))
        {
            out.ephemeral.push(fs.clone());
        } else if !is_under(&fs.mount, &rules.overlay_prefix) {
            out.physical.push(fs.clone());
        }
    }
    out
}

/// Drop zero-size and virtual block devices.
pub fn physical_disks(disks: Vec<PhysicalDisk>) -> Vec<PhysicalDisk> {
    disks
        .into_iter()
        .filter(|d| d.size > 0 && d.type_ != "Virtual")
        .collect()
}
