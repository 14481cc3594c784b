//! # cuefix Common Library
//!
//! Turns a cue-point CSV into a category-movement fixture document:
//! - Lookup index over the path, data and category tables
//! - Category resolution (single and combined two-file)
//! - Cue range parsing
//! - Record assembly with flavor-dependent field sets
//! - Pipeline driver owning the pk counter
//! - Configuration loading (flavor presets, TOML, CLI overrides)
//! - CSV reader, JSON table loader and atomic fixture sink

pub mod assembler;
pub mod config;
pub mod cue;
pub mod error;
pub mod fixture_io;
pub mod lookup;
pub mod pipeline;
pub mod resolver;

pub use assembler::{MovementFields, OutputRecord, RecordAssembler};
pub use config::{AppConfig, Flavor, PipelineConfig};
pub use cue::{parse_cue, CueOutcome, CueParser, CueRange};
pub use error::{Error, ResolutionError, Result, RowError};
pub use fixture_io::RawRow;
pub use lookup::{LookupTables, Pk, TablePaths};
pub use pipeline::{Pipeline, PipelineOutput, SkippedRow};
pub use resolver::{CategoryRecord, CategoryResolver};
