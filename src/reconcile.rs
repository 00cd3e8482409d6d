// Container reconciliation: pair each inventory record with its stat sample and
// normalize the sample's field names.

use crate::models::{
    BlockIo, ContainerRecord, ContainerUsage, NetIo, StatSample, UnifiedContainer,
};

/// Candidate field paths per normalized field, first present wins.
/// Both the camelCase and snake_case conventions show up depending on the stats source.
pub const CPU_FIELDS: &[&str] = &["cpuPercent", "cpu_percent"];
pub const MEM_FIELDS: &[&str] = &["memUsage", "mem_usage"];
pub const MEM_LIMIT_FIELDS: &[&str] = &["memLimit", "mem_limit"];
pub const NET_RX_FIELDS: &[&str] = &["netIO.rx"];
pub const NET_TX_FIELDS: &[&str] = &["netIO.tx", "netIO.wx"];
pub const BLOCK_R_FIELDS: &[&str] = &["blockIO.r"];
pub const BLOCK_W_FIELDS: &[&str] = &["blockIO.w"];

/// Find the sample id belonging to `record_id`. Rules, in order (first match wins):
/// exact equality, sample id is a prefix of the record id, record id is a prefix of
/// the sample id. Each rule is tried across all samples before the next one. Empty
/// ids never match.
pub fn match_sample<'a, I>(record_id: &str, sample_ids: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    if record_id.is_empty() {
        return None;
    }
    let ids = sample_ids.into_iter().filter(|s| !s.is_empty());
    let rules: [&dyn Fn(&str) -> bool; 3] = [
        &|s| s == record_id,
        &|s| record_id.starts_with(s),
        &|s| s.starts_with(record_id),
    ];
    rules
        .iter()
        .find_map(|rule| ids.clone().find(|s| rule(*s)))
}

fn first_number(sample: &StatSample, paths: &[&str]) -> f64 {
    paths
        .iter()
        .find_map(|path| sample.number_at(path))
        .unwrap_or(0.0)
}

/// Map a raw sample onto the normalized usage fields.
pub fn normalize(sample: &StatSample) -> ContainerUsage {
    ContainerUsage {
        cpu: first_number(sample, CPU_FIELDS),
        mem: first_number(sample, MEM_FIELDS),
        mem_limit: first_number(sample, MEM_LIMIT_FIELDS),
        net_io: NetIo {
            rx: first_number(sample, NET_RX_FIELDS),
            tx: first_number(sample, NET_TX_FIELDS),
        },
        block_io: BlockIo {
            r: first_number(sample, BLOCK_R_FIELDS),
            w: first_number(sample, BLOCK_W_FIELDS),
        },
    }
}

/// One unified container per record, in inventory order. Records without a matching
/// sample get all-zero usage; no record is ever dropped.
pub fn reconcile(records: Vec<ContainerRecord>, samples: &[StatSample]) -> Vec<UnifiedContainer> {
    records
        .into_iter()
        .map(|record| {
            let stats = match_sample(&record.id, samples.iter().map(|s| s.id.as_str()))
                .and_then(|id| samples.iter().find(|s| s.id == id))
                .map(normalize)
                .unwrap_or_default();
            UnifiedContainer { record, stats }
        })
        .collect()
}
