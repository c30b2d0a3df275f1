//! Configuration loading from disk.

use std::path::Path;

use fpc_stackup::catalog::ThicknessUnit;
use fpc_stackup::config::{load_config, load_config_or_default};
use fpc_stackup::error::ConfigError;

#[test]
fn example_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/example-config.json");
    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.default_category.as_deref(), Some("FCCL"));
    assert_eq!(config.thickness_unit(), ThicknessUnit::Micrometre);
    assert!(config.export.byte_order_mark);
}

#[test]
fn validation_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "logging": { "level": "chatty" } }"#).unwrap();

    let err = load_config_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains("chatty"));
}

#[test]
fn unknown_section_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "ipc": { "default_density": "N" } }"#).unwrap();

    let err = load_config(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}
