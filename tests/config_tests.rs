// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration loading

use geosnap::Config;
use geosnap::backends::camera::FacingMode;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

// Environment variables are process-global
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_missing_file_yields_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let config = Config::load_from(Some(dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_default_location_options() {
    let config = Config::default();
    let options = config.location.position_options();

    assert!(options.high_accuracy);
    assert_eq!(options.timeout, Duration::from_secs(10));
    assert_eq!(options.max_cache_age, Duration::ZERO);
}

#[test]
fn test_file_overrides_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[camera]
facing = "environment"
ideal_width = 640
ideal_height = 480

[location]
timeout_ms = 2500

[export]
directory = "/tmp/reports"
"#,
    );

    let config = Config::load_from(Some(path)).unwrap();
    assert_eq!(config.camera.facing, FacingMode::Environment);
    assert_eq!(config.camera.ideal_width, 640);
    assert_eq!(config.camera.ideal_height, 480);
    assert_eq!(config.location.timeout_ms, 2500);
    assert!(config.location.high_accuracy, "Unset keys keep their default");
    assert_eq!(config.export.directory(), PathBuf::from("/tmp/reports"));
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[location]\ntimeout_ms = 2500\n");

    unsafe { std::env::set_var("GEOSNAP_LOCATION__TIMEOUT_MS", "7000") };
    let result = Config::load_from(Some(path));
    unsafe { std::env::remove_var("GEOSNAP_LOCATION__TIMEOUT_MS") };

    assert_eq!(result.unwrap().location.timeout_ms, 7000);
}

#[test]
fn test_zero_timeout_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[location]\ntimeout_ms = 0\n");

    assert!(Config::load_from(Some(path)).is_err());
}

#[test]
fn test_non_http_map_url_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[export]\nmap_base_url = \"ftp://maps.example\"\n");

    assert!(Config::load_from(Some(path)).is_err());
}

#[test]
fn test_malformed_file_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[camera\nideal_width = ");

    assert!(Config::load_from(Some(path)).is_err());
}
