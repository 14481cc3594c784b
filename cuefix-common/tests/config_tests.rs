//! Configuration layering tests
//!
//! Covers preset → TOML → CLI priority and config file discovery.
//!
//! Note: tests that touch CUEFIX_CONFIG are marked #[serial] so they never
//! race each other on the process environment.

use cuefix_common::config::{
    resolve_config_path, AppConfig, CliOverrides, FieldOrderPolicy, Flavor, InvalidCuePolicy,
    ResolveMode, TomlConfig, CONFIG_ENV_VAR, DEFAULT_CSV, DEFAULT_OUTPUT, DEFAULT_PATHS_TABLE,
};
use cuefix_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_defaults_without_file_or_cli() {
    let config = AppConfig::resolve(TomlConfig::default(), CliOverrides::default()).unwrap();

    assert_eq!(config.flavor, Flavor::CuePoints);
    assert_eq!(config.pipeline.resolve_mode, ResolveMode::Single);
    assert_eq!(config.pipeline.pk_start, 3000);
    assert_eq!(config.csv, PathBuf::from(DEFAULT_CSV));
    assert_eq!(config.tables.paths, PathBuf::from(DEFAULT_PATHS_TABLE));
    assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_toml_overlays_flavor_preset() {
    let toml = TomlConfig::from_toml_str(
        r#"
flavor = "cue-points"

[pipeline]
end_sentinel = 90000
slug_suffix = "-steps"
allowed_types = ["SEQUENCE"]

[inputs]
csv = "in/cues.csv"
output = "out/movements.json"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = AppConfig::resolve(toml, CliOverrides::default()).unwrap();

    assert_eq!(config.flavor, Flavor::CuePoints);
    assert_eq!(config.pipeline.end_sentinel, 90000);
    assert_eq!(config.pipeline.slug_suffix, "-steps");
    assert_eq!(config.pipeline.allowed_types, vec!["SEQUENCE".to_string()]);
    // Keys not in the file keep the preset
    assert_eq!(config.pipeline.field_order, FieldOrderPolicy::ZeroFilled);
    assert_eq!(config.pipeline.invalid_cue, InvalidCuePolicy::Skip);
    assert_eq!(config.pipeline.resolve_mode, ResolveMode::Single);
    assert_eq!(config.csv, PathBuf::from("in/cues.csv"));
    assert_eq!(config.output, PathBuf::from("out/movements.json"));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_cli_beats_toml() {
    let toml = TomlConfig::from_toml_str(
        r#"
flavor = "cue-points"
[pipeline]
pk_start = 100
[inputs]
csv = "from_file.csv"
"#,
    )
    .unwrap();

    let cli = CliOverrides {
        flavor: Some(Flavor::Combined),
        csv: Some(PathBuf::from("from_cli.csv")),
        pk_start: Some(9000),
        log_level: Some("warn".to_string()),
        ..Default::default()
    };

    let config = AppConfig::resolve(toml, cli).unwrap();
    assert_eq!(config.flavor, Flavor::Combined);
    assert_eq!(config.pipeline.end_sentinel, 2000);
    assert_eq!(config.pipeline.pk_start, 9000);
    assert_eq!(config.csv, PathBuf::from("from_cli.csv"));
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_policy_keys_use_kebab_case() {
    let toml = TomlConfig::from_toml_str(
        r#"
[pipeline]
field_order = "zero-filled"
invalid_cue = "skip"
resolve_mode = "single"
"#,
    )
    .unwrap();
    let config = AppConfig::resolve(toml, CliOverrides::default()).unwrap();
    assert_eq!(config.pipeline.field_order, FieldOrderPolicy::ZeroFilled);
    assert_eq!(config.pipeline.invalid_cue, InvalidCuePolicy::Skip);
    assert_eq!(config.pipeline.resolve_mode, ResolveMode::Single);
}

#[test]
fn test_unknown_key_rejected() {
    let err = TomlConfig::from_toml_str("[pipeline]\nend_sentinal = 5\n").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_empty_whitelist_rejected() {
    let toml = TomlConfig::from_toml_str("[pipeline]\nallowed_types = []\n").unwrap();
    assert!(AppConfig::resolve(toml, CliOverrides::default()).is_err());
}

#[test]
#[serial]
fn test_config_path_cli_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let path = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")));
    assert_eq!(path, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_config_path_from_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let path = resolve_config_path(None);
    assert_eq!(path, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_reads_file_from_env() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("cuefix.toml");
    std::fs::write(&file, "flavor = \"cue-points\"\n[pipeline]\npk_start = 42\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &file);

    let config = AppConfig::load(None, CliOverrides::default()).unwrap();
    assert_eq!(config.flavor, Flavor::CuePoints);
    assert_eq!(config.pipeline.pk_start, 42);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_missing_explicit_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    let err = AppConfig::load(Some(&missing), CliOverrides::default()).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
