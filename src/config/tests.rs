//! Tests for config functionality.

use crate::config::types::default_exclude_patterns;
use crate::config::{Config, DEFAULT_LEASE_DURATION_SECS, MAX_LEASE_DURATION_SECS};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.lease_duration_secs, 600);
    assert_eq!(config.lease_duration_secs, DEFAULT_LEASE_DURATION_SECS);
    assert!(config.exclusive_create);
    assert_eq!(config.lock_dir, "locks");
    assert_eq!(config.activity_dir, "activity");
    assert_eq!(config.exclude_patterns, default_exclude_patterns());
    assert_eq!(config.lease_duration().num_minutes(), 10);
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();

    assert_eq!(config.lease_duration_secs, 600);
    assert_eq!(config.lock_dir, "locks");
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
lease_duration_secs: 120
exclusive_create: false
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lease_duration_secs, 120);
    assert!(!config.exclusive_create);
    // Unspecified values should use defaults
    assert_eq!(config.activity_dir, "activity");
    assert!(!config.exclude_patterns.is_empty());
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
lease_duration_secs: 30
exclusive_create: true
lock_dir: /var/run/agents/locks
activity_dir: journal
exclude_patterns:
  - "**/*.bak"
  - "docs/**"
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lease_duration_secs, 30);
    assert_eq!(config.lock_dir, "/var/run/agents/locks");
    assert_eq!(config.activity_dir, "journal");
    assert_eq!(config.exclude_patterns, vec!["**/*.bak", "docs/**"]);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
lease_duration_secs: 45
some_future_setting: true
nested_future:
  key: value
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.lease_duration_secs, 45);
}

#[test]
fn test_zero_lease_rejected() {
    let err = Config::from_yaml("lease_duration_secs: 0").unwrap_err();
    assert!(err.to_string().contains("lease_duration_secs"));
}

#[test]
fn test_oversized_lease_rejected() {
    let yaml = format!("lease_duration_secs: {}", MAX_LEASE_DURATION_SECS + 1);
    let err = Config::from_yaml(&yaml).unwrap_err();
    assert!(err.to_string().contains("at most"));
}

#[test]
fn test_empty_dirs_rejected() {
    assert!(Config::from_yaml("lock_dir: ''").is_err());
    assert!(Config::from_yaml("activity_dir: '  '").is_err());
}

#[test]
fn test_invalid_exclude_pattern_rejected() {
    let yaml = r#"
exclude_patterns:
  - "src/[unclosed"
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("invalid exclude pattern"));
}

#[test]
fn test_yaml_roundtrip() {
    let mut config = Config::default();
    config.lease_duration_secs = 90;
    config.exclude_patterns = vec!["**/*.out".to_string()];

    let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();

    assert_eq!(parsed.lease_duration_secs, 90);
    assert_eq!(parsed.exclude_patterns, vec!["**/*.out"]);
}

#[test]
fn test_load_or_default_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_or_default(temp_dir.path().join("config.yaml")).unwrap();
    assert_eq!(config.lease_duration_secs, 600);
}

#[test]
fn test_load_or_default_invalid_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    std::fs::write(&path, "lease_duration_secs: [not, a, number]").unwrap();

    assert!(Config::load_or_default(&path).is_err());
}
