//! cuefix-gen library - command implementations behind the binary
//!
//! Kept separate from `main.rs` so integration tests can drive the
//! commands without spawning a process.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use cuefix_common::config::{AppConfig, CliOverrides};
use cuefix_common::fixture_io::{read_cue_rows, render_fixture, required_columns, write_fixture};
use cuefix_common::{CategoryResolver, Flavor, LookupTables, Pipeline, TablePaths};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for cuefix-gen
#[derive(Parser, Debug)]
#[command(name = "cuefix-gen")]
#[command(about = "Generate category-movement fixtures from a cue-point CSV")]
#[command(version)]
pub struct Args {
    /// TOML configuration file (falls back to CUEFIX_CONFIG, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CUEFIX_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert the cue CSV into a fixture document
    Generate(GenerateArgs),
    /// Resolve one filename against the lookup tables
    Lookup(LookupArgs),
}

/// Lookup table locations
#[derive(ClapArgs, Debug, Default)]
pub struct TableArgs {
    /// Path → pk table
    #[arg(long)]
    pub paths: Option<PathBuf>,

    /// Pk → category id table
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Category id → name/slug table
    #[arg(long)]
    pub categories: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Default)]
pub struct GenerateArgs {
    /// Output flavor preset (cue-points, combined)
    #[arg(long)]
    pub flavor: Option<Flavor>,

    /// Cue-point CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Fixture output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// First pk assigned in this run
    #[arg(long)]
    pub pk_start: Option<u64>,

    /// Also print the fixture document to stdout
    #[arg(long)]
    pub print: bool,

    #[command(flatten)]
    pub tables: TableArgs,
}

#[derive(ClapArgs, Debug)]
pub struct LookupArgs {
    /// Filename to resolve (matched as a substring of recorded paths)
    pub filename: String,

    /// Resolve in combined mode: name/slug from this file, key from FILENAME
    #[arg(long)]
    pub secondary: Option<String>,

    #[command(flatten)]
    pub tables: TableArgs,
}

impl Args {
    /// Resolve the run configuration for the selected command
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut cli = CliOverrides {
            log_level: self.log_level.clone(),
            ..Default::default()
        };

        let tables = match &self.command {
            Command::Generate(generate) => {
                cli.flavor = generate.flavor;
                cli.csv = generate.csv.clone();
                cli.output = generate.output.clone();
                cli.pk_start = generate.pk_start;
                &generate.tables
            }
            Command::Lookup(lookup) => &lookup.tables,
        };
        cli.paths = tables.paths.clone();
        cli.data = tables.data.clone();
        cli.categories = tables.categories.clone();

        AppConfig::load(self.config.as_deref(), cli).context("Failed to load configuration")
    }
}

/// Outcome of a generate run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub records: usize,
    pub skipped: usize,
    pub output: PathBuf,
}

/// Load tables, run the pipeline over the CSV and write the fixture
///
/// Fatal errors surface before anything is written.
pub fn run_generate(config: &AppConfig, print: bool) -> Result<GenerateSummary> {
    let tables = load_tables(&config.tables)?;

    let required = required_columns(config.pipeline.resolve_mode);
    let rows = read_cue_rows(&config.csv, required)
        .with_context(|| format!("Failed to read cue CSV {}", config.csv.display()))?;
    info!(rows = rows.len(), csv = %config.csv.display(), flavor = ?config.flavor, "Cue CSV loaded");

    let mut pipeline = Pipeline::new(&tables, &config.pipeline);
    let output = pipeline.run(rows);

    write_fixture(&output.records, &config.output)
        .with_context(|| format!("Failed to write fixture {}", config.output.display()))?;

    if print {
        print!("{}", render_fixture(&output.records)?);
    }

    info!(
        "Wrote {} record(s) to {} ({} row(s) skipped)",
        output.records.len(),
        config.output.display(),
        output.skipped.len()
    );

    Ok(GenerateSummary {
        records: output.records.len(),
        skipped: output.skipped.len(),
        output: config.output.clone(),
    })
}

/// Resolve one filename (or a combined pair) and render the result as JSON
pub fn run_lookup(tables: &TablePaths, filename: &str, secondary: Option<&str>) -> Result<String> {
    let tables = load_tables(tables)?;
    let resolver = CategoryResolver::new(&tables);

    let record = match secondary {
        Some(secondary) => resolver.resolve_combined(filename, secondary),
        None => resolver.resolve(filename),
    }?;

    let rendered = serde_json::to_string_pretty(&json!({
        "name": record.name,
        "slug": record.slug,
        "category_pk": record.category_key,
    }))?;
    Ok(rendered)
}

fn load_tables(paths: &TablePaths) -> Result<LookupTables> {
    let tables = LookupTables::from_files(paths).context("Failed to load lookup tables")?;
    info!(
        paths = %paths.paths.display(),
        entries = tables.path_count(),
        "Lookup tables loaded"
    );
    Ok(tables)
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `level` applies to the cuefix crates.
pub fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("cuefix_common={level},cuefix_gen={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_args() {
        let args = Args::try_parse_from([
            "cuefix-gen",
            "generate",
            "--flavor",
            "cue-points",
            "--csv",
            "cues.csv",
            "--pk-start",
            "10",
            "--print",
        ])
        .unwrap();

        match args.command {
            Command::Generate(generate) => {
                assert_eq!(generate.flavor, Some(Flavor::CuePoints));
                assert_eq!(generate.csv, Some(PathBuf::from("cues.csv")));
                assert_eq!(generate.pk_start, Some(10));
                assert!(generate.print);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_lookup_args() {
        let args = Args::try_parse_from([
            "cuefix-gen",
            "lookup",
            "exs_101_bhumi.mp4",
            "--paths",
            "urls.json",
            "--secondary",
            "clip.mp4",
        ])
        .unwrap();

        match args.command {
            Command::Lookup(lookup) => {
                assert_eq!(lookup.filename, "exs_101_bhumi.mp4");
                assert_eq!(lookup.secondary.as_deref(), Some("clip.mp4"));
                assert_eq!(lookup.tables.paths, Some(PathBuf::from("urls.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_flavor_rejected() {
        assert!(Args::try_parse_from(["cuefix-gen", "generate", "--flavor", "v9"]).is_err());
    }
}
