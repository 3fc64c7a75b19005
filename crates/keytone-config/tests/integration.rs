//! Integration tests for keytone-config file handling.

use keytone_config::{ConfigError, EngineConfig};
use tempfile::TempDir;

#[test]
fn save_then_load_preserves_every_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = EngineConfig::default();
    config.audio.sample_rate = 44100;
    config.audio.output_device = Some("pulse".to_string());
    config.engine.seed = Some(42);
    config.defaults.background_music_enabled = true;

    config.save(&path).unwrap();
    assert!(path.is_file());

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn load_or_default_tolerates_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn invalid_file_fails_validation_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[engine]\nblock_size = 100000\n").unwrap();

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got {err}");
}
