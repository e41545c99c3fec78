//! Config file discovery and layering under a temporary XDG_CONFIG_HOME.
use std::fs;
use std::sync::Mutex;

use reactor_agent::config::{config_path, load_config, load_config_from, parse_args, AgentConfig};
use reactor_agent::RetryPolicy;

// Global lock to serialize tests that mutate process-wide environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn with_xdg<F: FnOnce(&std::path::Path)>(f: F) {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let prev = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", dir.path());
    f(dir.path());
    match prev {
        Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
}

#[test]
fn config_lives_under_xdg_config_home() {
    with_xdg(|root| {
        assert_eq!(config_path(), root.join("reactor_agent").join("config.json"));
    });
}

#[test]
fn missing_file_gives_defaults() {
    with_xdg(|_| {
        assert_eq!(load_config(), AgentConfig::default());
    });
}

#[test]
fn file_values_load_and_cli_wins() {
    with_xdg(|root| {
        let dir = root.join("reactor_agent");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.json"),
            r#"{"port":"/dev/ttyACM2","baud":57600,"interval_ms":2000,"backoff":true,"extra":1}"#,
        )
        .unwrap();

        let file = load_config();
        assert_eq!(file.port.as_deref(), Some("/dev/ttyACM2"));
        assert_eq!(file.baud, 57_600);
        assert_eq!(file.retry_policy(), RetryPolicy::backoff());

        let cli = parse_args(["reactor_agent", "-p", "/dev/ttyUSB9", "--interval-ms", "250"].map(String::from)).unwrap();
        let merged = file.merge(&cli);
        assert_eq!(merged.port.as_deref(), Some("/dev/ttyUSB9"));
        assert_eq!(merged.interval_ms, 250);
        assert_eq!(merged.baud, 57_600);
    });
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();
    assert_eq!(load_config_from(&path), AgentConfig::default());
}
