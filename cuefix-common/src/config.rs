//! Configuration loading and resolution
//!
//! Values come from four tiers, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable (where one is named)
//! 3. TOML config file
//! 4. Flavor preset / compiled default
//!
//! A flavor preset captures one historical output shape (end sentinel, record
//! shape for cue-less rows, type whitelist, single or combined resolution).
//! The `[pipeline]` table of the TOML file overlays individual options on top
//! of the preset.

use crate::lookup::TablePaths;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "CUEFIX_CONFIG";

/// Default fixture model label
pub const DEFAULT_MODEL: &str = "kalari.CategoriesMovements";

/// Default first pk of a run
pub const DEFAULT_PK_START: u64 = 3000;

/// Default input and output locations
pub const DEFAULT_CSV: &str = "input_files/cue_file.csv";
pub const DEFAULT_PATHS_TABLE: &str = "input_files/odissi_categories_data_urls.json";
pub const DEFAULT_DATA_TABLE: &str = "input_files/odissi_categories_data.json";
pub const DEFAULT_CATEGORIES_TABLE: &str = "input_files/odissi_categories.json";
pub const DEFAULT_OUTPUT: &str = "odissi_categories_movements.json";

/// Output flavor preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    /// Single-file resolution, zero-filled timing, 70000 sentinel
    #[default]
    CuePoints,
    /// Two-file resolution, relation-only records, 2000 sentinel
    Combined,
}

impl FromStr for Flavor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cue-points" => Ok(Flavor::CuePoints),
            "combined" => Ok(Flavor::Combined),
            other => Err(Error::Config(format!(
                "unknown flavor '{}' (expected cue-points or combined)",
                other
            ))),
        }
    }
}

/// Record shape for rows without a usable cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldOrderPolicy {
    /// Omit start/end, append `is_related_only: true` after `type`
    RelatedOnly,
    /// Keep the timed shape with start 0 and end = end sentinel
    ZeroFilled,
}

/// Handling of a non-empty cue that fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidCuePolicy {
    /// Reject the row
    Skip,
    /// Continue as if the cue were empty
    TreatAsAbsent,
}

/// Which CSV column(s) drive category resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolveMode {
    /// Resolve `movie` alone
    Single,
    /// Key from `category_pk`, name/slug from `movie`
    Combined,
}

/// Pipeline options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub model: String,
    pub pk_start: u64,
    pub end_sentinel: i64,
    pub field_order: FieldOrderPolicy,
    pub invalid_cue: InvalidCuePolicy,
    pub slug_suffix: String,
    pub allowed_types: Vec<String>,
    pub resolve_mode: ResolveMode,
}

impl PipelineConfig {
    /// Preset options for a flavor
    pub fn for_flavor(flavor: Flavor) -> Self {
        match flavor {
            Flavor::CuePoints => Self {
                model: DEFAULT_MODEL.to_string(),
                pk_start: DEFAULT_PK_START,
                end_sentinel: 70000,
                field_order: FieldOrderPolicy::ZeroFilled,
                invalid_cue: InvalidCuePolicy::Skip,
                slug_suffix: String::new(),
                allowed_types: to_strings(&["EXPLANATION", "SEQUENCE", "UNIT"]),
                resolve_mode: ResolveMode::Single,
            },
            Flavor::Combined => Self {
                model: DEFAULT_MODEL.to_string(),
                pk_start: DEFAULT_PK_START,
                end_sentinel: 2000,
                field_order: FieldOrderPolicy::RelatedOnly,
                invalid_cue: InvalidCuePolicy::TreatAsAbsent,
                slug_suffix: String::new(),
                allowed_types: to_strings(&["EXPLANATION", "SEQUENCE", "UNIT", "CONTEXT"]),
                resolve_mode: ResolveMode::Combined,
            },
        }
    }

    /// Overlay options present in a TOML `[pipeline]` table
    pub fn apply(&mut self, overrides: &PipelineOverrides) {
        if let Some(model) = &overrides.model {
            self.model = model.clone();
        }
        if let Some(pk_start) = overrides.pk_start {
            self.pk_start = pk_start;
        }
        if let Some(end_sentinel) = overrides.end_sentinel {
            self.end_sentinel = end_sentinel;
        }
        if let Some(field_order) = overrides.field_order {
            self.field_order = field_order;
        }
        if let Some(invalid_cue) = overrides.invalid_cue {
            self.invalid_cue = invalid_cue;
        }
        if let Some(slug_suffix) = &overrides.slug_suffix {
            self.slug_suffix = slug_suffix.clone();
        }
        if let Some(allowed_types) = &overrides.allowed_types {
            self.allowed_types = allowed_types.clone();
        }
        if let Some(resolve_mode) = overrides.resolve_mode {
            self.resolve_mode = resolve_mode;
        }
    }

    /// Check option combinations that cannot produce output
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("model label must not be empty".to_string()));
        }
        if self.allowed_types.is_empty() {
            return Err(Error::Config("allowed_types must list at least one type".to_string()));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_flavor(Flavor::default())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// `[pipeline]` table: every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineOverrides {
    pub model: Option<String>,
    pub pk_start: Option<u64>,
    pub end_sentinel: Option<i64>,
    pub field_order: Option<FieldOrderPolicy>,
    pub invalid_cue: Option<InvalidCuePolicy>,
    pub slug_suffix: Option<String>,
    pub allowed_types: Option<Vec<String>>,
    pub resolve_mode: Option<ResolveMode>,
}

/// `[inputs]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputsConfig {
    pub csv: Option<PathBuf>,
    pub paths: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub categories: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of a cuefix TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub flavor: Option<Flavor>,
    #[serde(default)]
    pub pipeline: PipelineOverrides,
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}

/// Locate the config file
///
/// Priority: CLI argument, then `CUEFIX_CONFIG`, then
/// `<config dir>/cuefix/cuefix.toml` if it exists. `None` means run on
/// presets and defaults alone.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("cuefix").join("cuefix.toml"))
        .filter(|p| p.exists())
}

/// Command-line values that take precedence over the TOML file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub flavor: Option<Flavor>,
    pub csv: Option<PathBuf>,
    pub paths: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub categories: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pk_start: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved run configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub flavor: Flavor,
    pub pipeline: PipelineConfig,
    pub csv: PathBuf,
    pub tables: TablePaths,
    pub output: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Merge CLI values, TOML file and presets into one configuration
    pub fn resolve(toml: TomlConfig, cli: CliOverrides) -> Result<Self> {
        let flavor = cli.flavor.or(toml.flavor).unwrap_or_default();

        let mut pipeline = PipelineConfig::for_flavor(flavor);
        pipeline.apply(&toml.pipeline);
        if let Some(pk_start) = cli.pk_start {
            pipeline.pk_start = pk_start;
        }
        pipeline.validate()?;

        let pick = |cli: Option<PathBuf>, file: Option<PathBuf>, default: &str| {
            cli.or(file).unwrap_or_else(|| PathBuf::from(default))
        };

        let inputs = toml.inputs;
        Ok(Self {
            flavor,
            pipeline,
            csv: pick(cli.csv, inputs.csv, DEFAULT_CSV),
            tables: TablePaths {
                paths: pick(cli.paths, inputs.paths, DEFAULT_PATHS_TABLE),
                data: pick(cli.data, inputs.data, DEFAULT_DATA_TABLE),
                categories: pick(cli.categories, inputs.categories, DEFAULT_CATEGORIES_TABLE),
            },
            output: pick(cli.output, inputs.output, DEFAULT_OUTPUT),
            log_level: cli.log_level.unwrap_or(toml.logging.level),
        })
    }

    /// Resolve the config file location, load it if present, merge with CLI values
    pub fn load(config_arg: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let toml = match resolve_config_path(config_arg) {
            Some(path) => TomlConfig::load(&path)?,
            None => TomlConfig::default(),
        };
        Self::resolve(toml, cli)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_presets() {
        let cue_points = PipelineConfig::for_flavor(Flavor::CuePoints);
        assert_eq!(cue_points.end_sentinel, 70000);
        assert_eq!(cue_points.field_order, FieldOrderPolicy::ZeroFilled);
        assert_eq!(cue_points.invalid_cue, InvalidCuePolicy::Skip);
        assert_eq!(cue_points.resolve_mode, ResolveMode::Single);
        assert!(!cue_points.allowed_types.contains(&"CONTEXT".to_string()));

        let combined = PipelineConfig::for_flavor(Flavor::Combined);
        assert_eq!(combined.end_sentinel, 2000);
        assert_eq!(combined.field_order, FieldOrderPolicy::RelatedOnly);
        assert_eq!(combined.invalid_cue, InvalidCuePolicy::TreatAsAbsent);
        assert_eq!(combined.resolve_mode, ResolveMode::Combined);
        assert!(combined.allowed_types.contains(&"CONTEXT".to_string()));
    }

    #[test]
    fn test_default_flavor_resolves_single_file() {
        assert_eq!(Flavor::default(), Flavor::CuePoints);
        let config = PipelineConfig::default();
        assert_eq!(config.resolve_mode, ResolveMode::Single);
        assert_eq!(config, PipelineConfig::for_flavor(Flavor::CuePoints));
    }

    #[test]
    fn test_flavor_from_str() {
        assert_eq!("cue-points".parse::<Flavor>().unwrap(), Flavor::CuePoints);
        assert_eq!("combined".parse::<Flavor>().unwrap(), Flavor::Combined);
        assert!("v3".parse::<Flavor>().is_err());
    }

    #[test]
    fn test_overrides_apply_over_preset() {
        let mut config = PipelineConfig::for_flavor(Flavor::CuePoints);
        config.apply(&PipelineOverrides {
            end_sentinel: Some(1234),
            slug_suffix: Some("-x".to_string()),
            ..Default::default()
        });
        assert_eq!(config.end_sentinel, 1234);
        assert_eq!(config.slug_suffix, "-x");
        // Untouched keys keep preset values
        assert_eq!(config.field_order, FieldOrderPolicy::ZeroFilled);
    }

    #[test]
    fn test_validate_rejects_empty_whitelist() {
        let mut config = PipelineConfig::default();
        config.allowed_types.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
