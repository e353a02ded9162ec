//! Tests for configuration loading, validation and overrides

use netreach::config::defaults::{DEFAULT_EVENT_CAPACITY, MAX_EVENT_CAPACITY, MAX_TIMEOUT_MS};
use netreach::config::Config;
use netreach::core::network::NetworkError;
use serial_test::serial;
use tempfile::TempDir;

fn clear_env() {
    std::env::remove_var("NETREACH_HOST");
    std::env::remove_var("NETREACH_TIMEOUT_MS");
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.host, None);
    assert_eq!(config.connect_timeout_ms, 3000);
    assert_eq!(config.read_timeout_ms, 5000);
    assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
    assert!(config.check().is_ok());
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sub").join("config.toml");

    let config = Config {
        host: Some("https://status.example.com".to_string()),
        connect_timeout_ms: 1500,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "host = \"example.com\"\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.probe_host(), Some("example.com"));
    assert_eq!(config.read_timeout_ms, 5000);
    assert_eq!(config.timeouts().connect_ms, 3000);
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    assert!(matches!(Config::load_from(&missing), Err(NetworkError::ConfigReadError(_))));

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "host = [").unwrap();
    assert!(matches!(Config::load_from(&broken), Err(NetworkError::ConfigParseError(_))));
}

#[test]
fn test_check_rejects_bad_values() {
    let zero_timeout = Config {
        connect_timeout_ms: 0,
        ..Config::default()
    };
    assert!(matches!(zero_timeout.check(), Err(NetworkError::ConfigInvalid(_))));

    let huge_timeout = Config {
        read_timeout_ms: MAX_TIMEOUT_MS + 1,
        ..Config::default()
    };
    assert!(huge_timeout.check().is_err());

    let no_capacity = Config {
        event_capacity: 0,
        ..Config::default()
    };
    assert!(no_capacity.check().is_err());

    let bad_host = Config {
        host: Some("http://".to_string()),
        ..Config::default()
    };
    assert!(matches!(bad_host.check(), Err(NetworkError::UrlError(_))));
}

#[test]
fn test_oversized_event_capacity_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "event_capacity = 9223372036854775807\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert!(matches!(config.check(), Err(NetworkError::ConfigInvalid(_))));

    let at_limit = Config {
        event_capacity: MAX_EVENT_CAPACITY,
        ..Config::default()
    };
    assert!(at_limit.check().is_ok());

    let over_limit = Config {
        event_capacity: MAX_EVENT_CAPACITY + 1,
        ..Config::default()
    };
    assert!(over_limit.check().is_err());
}

#[tokio::test]
async fn test_oversized_event_capacity_still_builds_machine() {
    use netreach::core::network::{ConnectivityClassifier, ConnectivityStateMachine, SnapshotSource};

    let source = std::sync::Arc::new(SnapshotSource::default());
    let classifier = ConnectivityClassifier::new(source.clone(), source);
    let probe = crate::common::StubProbe::new(true);

    let machine = ConnectivityStateMachine::new(classifier, probe, None, usize::MAX).unwrap();
    let _subscription = machine.subscribe();
    assert!(machine.has_subscribers());
}

#[test]
fn test_blank_host_disables_probing() {
    let config = Config {
        host: Some("   ".to_string()),
        ..Config::default()
    };
    assert_eq!(config.probe_host(), None);
    assert!(config.check().is_ok());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("NETREACH_HOST", "override.example.com");
    std::env::set_var("NETREACH_TIMEOUT_MS", "1200");

    let mut config = Config::default();
    config.apply_env_overrides();
    assert_eq!(config.probe_host(), Some("override.example.com"));
    assert_eq!(config.connect_timeout_ms, 1200);

    clear_env();
}

#[test]
#[serial]
fn test_env_timeout_is_clamped() {
    clear_env();

    std::env::set_var("NETREACH_TIMEOUT_MS", "999999");
    let mut config = Config::default();
    config.apply_env_overrides();
    assert_eq!(config.connect_timeout_ms, MAX_TIMEOUT_MS);

    std::env::set_var("NETREACH_TIMEOUT_MS", "0");
    config.apply_env_overrides();
    assert_eq!(config.connect_timeout_ms, 1);

    std::env::set_var("NETREACH_TIMEOUT_MS", "soon");
    config.apply_env_overrides();
    assert_eq!(config.connect_timeout_ms, 1);

    clear_env();
}
