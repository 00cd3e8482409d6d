// Turn a raw Docker stats API response into a stat sample.

use crate::models::StatSample;
use bollard::models::{ContainerBlkioStatEntry, ContainerStatsResponse};
use serde_json::json;

fn sum_blkio(entries: Option<&Vec<ContainerBlkioStatEntry>>) -> (u64, u64) {
    entries.map_or((0, 0), |entries| {
        let mut read = 0u64;
        let mut write = 0u64;
        for e in entries {
            match e.op.as_deref() {
                Some(op) if op.eq_ignore_ascii_case("read") => read += e.value.unwrap_or(0),
                Some(op) if op.eq_ignore_ascii_case("write") => write += e.value.unwrap_or(0),
                _ => {}
            }
        }
        (read, write)
    })
}

/// Build a sample in the camelCase naming convention (`cpuPercent`, `memUsage`,
/// `netIO.rx`). Returns `None` when the CPU counters needed for a delta are missing.
/// The sample id is the one reported by the stats response, falling back to `id`.
pub(crate) fn process_statistics(s: &ContainerStatsResponse, id: &str) -> Option<StatSample> {
    let cpu_stats = s.cpu_stats.as_ref()?;
    let precpu_stats = s.precpu_stats.as_ref()?;

    let cpu_usage = cpu_stats.cpu_usage.as_ref()?;
    let precpu_usage = precpu_stats.cpu_usage.as_ref()?;

    let cpu_delta =
        cpu_usage.total_usage.unwrap_or(0) as i64 - precpu_usage.total_usage.unwrap_or(0) as i64;
    let system_delta = cpu_stats.system_cpu_usage.unwrap_or(0) as i64
        - precpu_stats.system_cpu_usage.unwrap_or(0) as i64;
    let online = cpu_stats.online_cpus.unwrap_or(1) as f64;
    let cpu_percent = if system_delta > 0 && online > 0.0 {
        (cpu_delta as f64 / system_delta as f64) * online * 100.0
    } else {
        0.0
    };

    let mem_usage = s.memory_stats.as_ref().and_then(|m| m.usage).unwrap_or(0);
    let mem_limit = s.memory_stats.as_ref().and_then(|m| m.limit).unwrap_or(0);

    let (rx, tx) = s.networks.as_ref().map_or((0u64, 0u64), |n| {
        n.values().fold((0, 0), |(rx, tx), v| {
            (rx + v.rx_bytes.unwrap_or(0), tx + v.tx_bytes.unwrap_or(0))
        })
    });

    let (block_read, block_write) = sum_blkio(
        s.blkio_stats
            .as_ref()
            .and_then(|b| b.io_service_bytes_recursive.as_ref()),
    );

    let pids = s.pids_stats.as_ref().and_then(|p| p.current).unwrap_or(0);

    let fields = json!({
        "cpuPercent": cpu_percent.max(0.0),
        "memUsage": mem_usage,
        "memLimit": mem_limit,
        "memPercent": if mem_limit > 0 { mem_usage as f64 / mem_limit as f64 * 100.0 } else { 0.0 },
        "netIO": { "rx": rx, "tx": tx },
        "blockIO": { "r": block_read, "w": block_write },
        "pids": pids,
    });
    let serde_json::Value::Object(fields) = fields else {
        return None;
    };
    let sample_id = s.id.clone().filter(|i| !i.is_empty()).unwrap_or_else(|| id.to_string());
    Some(StatSample::new(sample_id, fields))
}
