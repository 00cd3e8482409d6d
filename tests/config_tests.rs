// Config loading and validation tests

use homedash::config::AppConfig;
use std::time::Duration;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[polling]
fast_interval_ms = 2000
detail_interval_ms = 10000
probe_timeout_ms = 4000
stats_log_interval_secs = 60

[history]
capacity = 40

[publishing]
broadcast_capacity = 16

[probes]
services = ["ssh", "docker"]
ephemeral_mounts = ["/tmp", "/run"]
overlay_prefix = "/var/lib/docker/overlay2"
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 8081
host = "127.0.0.1"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.polling.fast_interval_ms, 2000);
    assert_eq!(config.polling.probe_timeout_ms, 4000);
    assert_eq!(config.history.capacity, 40);
    assert_eq!(config.probes.services, vec!["ssh", "docker"]);
}

#[test]
fn test_config_defaults_when_sections_omitted() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("minimal");
    assert_eq!(config.polling.fast_interval_ms, 2000);
    assert_eq!(config.polling.detail_interval_ms, 10000);
    assert_eq!(config.polling.probe_timeout_ms, 5000);
    assert_eq!(config.history.capacity, 40);
    assert_eq!(config.publishing.broadcast_capacity, 16);
    assert_eq!(
        config.probes.services,
        vec!["ssh", "docker", "cron", "ufw", "networking"]
    );
    assert_eq!(
        config.probes.ephemeral_mounts,
        vec!["/mnt/ramdisk", "/var/log", "/tmp", "/run"]
    );
    assert_eq!(config.probes.overlay_prefix, "/var/lib/docker/overlay2");
}

#[test]
fn test_config_partial_section_keeps_other_defaults() {
    let s = format!("{}\n[polling]\nfast_interval_ms = 500\n", MINIMAL_CONFIG);
    let config = AppConfig::load_from_str(&s).expect("partial");
    assert_eq!(config.polling.fast_interval_ms, 500);
    assert_eq!(config.polling.detail_interval_ms, 10000);
}

#[test]
fn test_config_builds_component_configs() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    let agg = config.aggregator_config();
    assert_eq!(agg.probe_timeout, Duration::from_millis(4000));
    assert_eq!(agg.services, vec!["ssh", "docker"]);
    assert_eq!(agg.mounts.ephemeral_roots, vec!["/tmp", "/run"]);
    let pollers = config.poller_config();
    assert_eq!(pollers.fast_interval_ms, 2000);
    assert_eq!(pollers.detail_interval_ms, 10000);
}

fn rejects(from: &str, to: &str, key: &str) {
    let bad = VALID_CONFIG.replace(from, to);
    assert_ne!(bad, VALID_CONFIG, "replacement {:?} did not apply", from);
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(
        err.to_string().contains(key),
        "expected error about {}, got: {}",
        key,
        err
    );
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    rejects("port = 8081", "port = 0", "server.port");
}

#[test]
fn test_config_validation_rejects_empty_host() {
    rejects("host = \"0.0.0.0\"", "host = \"\"", "server.host");
}

#[test]
fn test_config_validation_rejects_zero_intervals() {
    rejects("fast_interval_ms = 2000", "fast_interval_ms = 0", "fast_interval_ms");
    rejects("detail_interval_ms = 10000", "detail_interval_ms = 0", "detail_interval_ms");
    rejects("probe_timeout_ms = 4000", "probe_timeout_ms = 0", "probe_timeout_ms");
    rejects(
        "stats_log_interval_secs = 60",
        "stats_log_interval_secs = 0",
        "stats_log_interval_secs",
    );
}

#[test]
fn test_config_validation_rejects_zero_capacities() {
    rejects("capacity = 40", "capacity = 0", "history.capacity");
    rejects("broadcast_capacity = 16", "broadcast_capacity = 0", "broadcast_capacity");
}

#[test]
fn test_config_validation_rejects_history_above_window() {
    rejects("capacity = 40", "capacity = 41", "history.capacity");
    rejects("capacity = 40", "capacity = 100", "history.capacity");
    let config = AppConfig::load_from_str(&VALID_CONFIG.replace("capacity = 40", "capacity = 1"))
        .expect("capacity 1 is allowed");
    assert_eq!(config.history.capacity, 1);
}

#[test]
fn test_config_validation_rejects_root_as_mount_root() {
    rejects("[\"/tmp\", \"/run\"]", "[\"/tmp\", \"/\"]", "ephemeral_mounts");
    rejects("[\"/tmp\", \"/run\"]", "[\"//\"]", "ephemeral_mounts");
    rejects(
        "overlay_prefix = \"/var/lib/docker/overlay2\"",
        "overlay_prefix = \"/\"",
        "overlay_prefix",
    );
}

#[test]
fn test_config_validation_rejects_relative_mounts() {
    rejects("[\"/tmp\", \"/run\"]", "[\"tmp\"]", "ephemeral_mounts");
    rejects(
        "overlay_prefix = \"/var/lib/docker/overlay2\"",
        "overlay_prefix = \"\"",
        "overlay_prefix",
    );
}

#[test]
fn test_config_validation_rejects_missing_server() {
    assert!(AppConfig::load_from_str("[history]\ncapacity = 10\n").is_err());
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.history.capacity, 40);
}
