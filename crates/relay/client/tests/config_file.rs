use std::io::Write;

use relay_client::{ConfigError, RelayConfig};

#[test]
fn loads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
subwallet_id = 3
send_timeout_secs = 300
wallet_timeout_secs = 90

[dispatch]
attempts = 4
interval_ms = 250
verbose = true
"#
    )
    .unwrap();

    let config = RelayConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.subwallet_id, 3);
    assert_eq!(config.send_timeout_secs, 300);
    assert_eq!(config.wallet_timeout_secs, 90);
    assert_eq!(config.dispatch.attempts, 4);
    assert_eq!(config.dispatch.interval_ms, 250);
    assert!(config.dispatch.verbose);
}

#[test]
fn empty_file_gives_defaults() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = RelayConfig::load(Some(file.path())).unwrap();
    assert_eq!(config, RelayConfig::default());
}

#[test]
fn invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.toml");
    std::fs::write(&path, "[dispatch]\nattempts = 0\n").unwrap();
    assert!(matches!(
        RelayConfig::load(Some(&path)),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn defaults_survive_a_toml_round_trip() {
    let text = toml::to_string(&RelayConfig::default()).unwrap();
    assert_eq!(RelayConfig::from_toml_str(&text).unwrap(), RelayConfig::default());
}

#[test]
fn config_serializes_to_json() {
    let json = serde_json::to_value(RelayConfig::default()).unwrap();
    assert_eq!(json["dispatch"]["attempts"], 10);
    assert_eq!(json["send_timeout_secs"], 128);
}
