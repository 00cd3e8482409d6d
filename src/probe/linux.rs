// Linux-specific helpers: /proc, /etc/os-release, /sys/class/net, /sys/block.

use crate::models::PhysicalDisk;

/// Read first "model name" from /proc/cpuinfo. Preferred over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Distro name from /etc/os-release: PRETTY_NAME, falling back to NAME.
pub(super) fn read_distro() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        return os_release_value(&content, "PRETTY_NAME")
            .or_else(|| os_release_value(&content, "NAME"));
    }
    #[cfg(not(target_os = "linux"))]
    None
}

fn os_release_value(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let v = line.strip_prefix(key)?.strip_prefix('=')?.trim_matches('"');
        (!v.is_empty()).then(|| v.to_string())
    })
}

/// Link speed from /sys/class/net/<interface>/speed, in bits per second; 0 if unavailable.
pub(super) fn interface_speed(interface_name: &str) -> u64 {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/speed", interface_name);
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(mbps) = content.trim().parse::<i64>()
            && mbps > 0
        {
            return (mbps as u64) * 1_000_000;
        }
    }
    0
}

/// Operational state ("up", "down", "unknown") from /sys/class/net/<interface>/operstate.
pub(super) fn interface_operstate(interface_name: &str) -> String {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/operstate", interface_name);
        if let Ok(content) = std::fs::read_to_string(&path) {
            let state = content.trim();
            if !state.is_empty() {
                return state.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// Block devices from /sys/block. Partitions are not listed there, only whole disks.
pub(super) fn read_block_devices() -> anyhow::Result<Vec<PhysicalDisk>> {
    #[cfg(target_os = "linux")]
    {
        let mut disks = Vec::new();
        for entry in std::fs::read_dir("/sys/block")? {
            let entry = entry?;
            let device = entry.file_name().to_string_lossy().into_owned();
            let base = entry.path();
            let read = |rel: &str| {
                std::fs::read_to_string(base.join(rel))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };
            let sectors: u64 = read("size").parse().unwrap_or(0);
            let is_virtual = std::fs::canonicalize(&base)
                .map(|p| p.starts_with("/sys/devices/virtual"))
                .unwrap_or(false);
            let type_ = if is_virtual {
                "Virtual"
            } else if device.starts_with("nvme") {
                "NVMe"
            } else if read("queue/rotational") == "1" {
                "HD"
            } else {
                "SSD"
            };
            disks.push(PhysicalDisk {
                name: read("device/model"),
                vendor: read("device/vendor"),
                size: sectors * 512,
                type_: type_.to_string(),
                device: format!("/dev/{}", device),
            });
        }
        disks.sort_by(|a, b| a.device.cmp(&b.device));
        Ok(disks)
    }
    #[cfg(not(target_os = "linux"))]
    anyhow::bail!("disk layout is only available on Linux")
}
