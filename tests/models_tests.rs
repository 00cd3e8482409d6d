// Model serialization tests (JSON wire names)

use homedash::models::*;
use serde_json::json;

#[test]
fn test_fast_snapshot_serialization_camel_case() {
    let snapshot = FastSnapshot {
        timestamp: 12345,
        uptime_seconds: 60,
        failed_probes: vec!["network".into()],
        ..Default::default()
    };
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"uptimeSeconds\":60"));
    assert!(json.contains("\"failedProbes\":[\"network\"]"));
    assert!(json.contains("\"currentLoad\""));
    let back: FastSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_detail_snapshot_null_temperature() {
    let v = serde_json::to_value(DetailSnapshot::default()).unwrap();
    assert!(v["temperature"].is_null());
    assert_eq!(v["connectionCount"], 0);
    assert!(v["topProcesses"].as_array().unwrap().is_empty());
    assert!(v["mounts"]["ephemeral"].as_array().unwrap().is_empty());
}

#[test]
fn test_filesystem_uses_short_field_names() {
    let fs = Filesystem {
        fs: "/dev/sda1".into(),
        type_: "ext4".into(),
        size: 100,
        used: 40,
        available: 60,
        use_percent: 40.0,
        mount: "/".into(),
    };
    let v = serde_json::to_value(&fs).unwrap();
    assert_eq!(v["type"], "ext4");
    assert_eq!(v["use"], 40.0);
    let back: Filesystem = serde_json::from_value(v).unwrap();
    assert_eq!(back, fs);
}

#[test]
fn test_container_state_from_docker() {
    assert_eq!(ContainerState::from_docker("Running"), ContainerState::Running);
    assert_eq!(ContainerState::from_docker("exited"), ContainerState::Exited);
    assert_eq!(ContainerState::from_docker("dead"), ContainerState::Dead);
    assert_eq!(ContainerState::from_docker(""), ContainerState::Unknown);
    let unknown: ContainerState = serde_json::from_str("\"zombie\"").unwrap();
    assert_eq!(unknown, ContainerState::Unknown);
}

#[test]
fn test_connection_state_from_ss_tokens() {
    assert_eq!(ConnectionState::from_ss("ESTAB"), ConnectionState::Established);
    assert_eq!(ConnectionState::from_ss("established"), ConnectionState::Established);
    assert_eq!(ConnectionState::from_ss("TIME-WAIT"), ConnectionState::TimeWait);
    assert_eq!(ConnectionState::from_ss("FIN-WAIT-1"), ConnectionState::FinWait1);
    assert_eq!(ConnectionState::from_ss("UNCONN"), ConnectionState::Unconnected);
    assert_eq!(ConnectionState::from_ss("weird"), ConnectionState::Unknown);
    assert_eq!(
        serde_json::to_string(&ConnectionState::Established).unwrap(),
        "\"ESTABLISHED\""
    );
}

#[test]
fn test_stat_sample_flattens_fields() {
    let sample: StatSample = serde_json::from_value(json!({
        "id": "abc",
        "cpu_percent": 3.5,
        "netIO": { "rx": 1, "wx": 2 }
    }))
    .unwrap();
    assert_eq!(sample.id, "abc");
    assert_eq!(sample.number_at("cpu_percent"), Some(3.5));
    assert_eq!(sample.number_at("netIO.wx"), Some(2.0));
    assert_eq!(sample.number_at("netIO.tx"), None);
    assert_eq!(sample.number_at("cpu_percent.nested"), None);
}

#[test]
fn test_memory_active_percent_guard() {
    let m = MemoryStats {
        active: 100,
        total: 0,
        ..Default::default()
    };
    assert_eq!(m.active_percent(), 0.0);
    let m = MemoryStats {
        active: 300,
        total: 1200,
        ..Default::default()
    };
    assert_eq!(m.active_percent(), 25.0);
}
