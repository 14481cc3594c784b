//! Pipeline driver
//!
//! Per row: type whitelist → cue parse → category resolution → assembly.
//! Row-scoped failures are logged, recorded as skipped and never consume a pk.
//! The pk counter belongs to the pipeline and is seeded from the config, so
//! two pipelines never share counter state.

use crate::assembler::{OutputRecord, RecordAssembler};
use crate::config::{InvalidCuePolicy, PipelineConfig, ResolveMode};
use crate::cue::{CueOutcome, CueParser};
use crate::error::RowError;
use crate::fixture_io::RawRow;
use crate::lookup::LookupTables;
use crate::resolver::CategoryResolver;
use std::collections::HashSet;

/// A row dropped from the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Source line (0 for in-memory rows)
    pub line: u64,
    pub movie: String,
    /// Combined-mode primary filename
    pub category_pk: Option<String>,
    pub reason: RowError,
}

/// Result of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    pub records: Vec<OutputRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Monotonic pk source
///
/// Hands out each value once. After `u64::MAX` has been handed out the counter
/// is exhausted and yields nothing rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkCounter {
    next: Option<u64>,
}

impl PkCounter {
    pub fn starting_at(start: u64) -> Self {
        Self { next: Some(start) }
    }

    /// Next pk to hand out, `None` once exhausted
    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    fn take(&mut self) -> Option<u64> {
        let pk = self.next?;
        self.next = pk.checked_add(1);
        Some(pk)
    }
}

/// Drives rows through parsing, resolution and assembly
pub struct Pipeline<'a> {
    resolver: CategoryResolver<'a>,
    parser: CueParser,
    assembler: RecordAssembler,
    allowed_types: HashSet<String>,
    invalid_cue: InvalidCuePolicy,
    resolve_mode: ResolveMode,
    pk: PkCounter,
}

impl<'a> Pipeline<'a> {
    pub fn new(tables: &'a LookupTables, config: &PipelineConfig) -> Self {
        Self {
            resolver: CategoryResolver::new(tables),
            parser: CueParser::new(config.end_sentinel),
            assembler: RecordAssembler::new(config),
            allowed_types: config.allowed_types.iter().cloned().collect(),
            invalid_cue: config.invalid_cue,
            resolve_mode: config.resolve_mode,
            pk: PkCounter::starting_at(config.pk_start),
        }
    }

    /// Next pk that will be assigned, `None` once the pk range is used up
    pub fn next_pk(&self) -> Option<u64> {
        self.pk.peek()
    }

    /// Process every row and return the assembled records plus skipped rows
    pub fn run<I>(&mut self, rows: I) -> PipelineOutput
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut output = PipelineOutput::default();

        for row in rows {
            match self.process(&row) {
                Ok(record) => output.records.push(record),
                Err(reason) => {
                    match &row.category_pk {
                        Some(primary) if self.resolve_mode == ResolveMode::Combined => {
                            tracing::warn!(
                                line = row.line,
                                "Skipping {}, {} - {}",
                                primary,
                                row.movie,
                                reason
                            );
                        }
                        _ => {
                            tracing::warn!(line = row.line, "Skipping {} - {}", row.movie, reason);
                        }
                    }
                    output.skipped.push(SkippedRow {
                        line: row.line,
                        movie: row.movie.clone(),
                        category_pk: row.category_pk.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            records = output.records.len(),
            skipped = output.skipped.len(),
            next_pk = ?self.pk.peek(),
            "Pipeline run complete"
        );

        output
    }

    /// Process a single row; on success the pk counter advances
    pub fn process(&mut self, row: &RawRow) -> Result<OutputRecord, RowError> {
        let type_value = row.kind.trim();
        if !self.allowed_types.contains(type_value) {
            return Err(RowError::TypeRejected(type_value.to_string()));
        }

        let cue = match self.parser.classify(&row.cue) {
            CueOutcome::Parsed(range) => Some(range),
            CueOutcome::Empty => None,
            CueOutcome::Malformed => match self.invalid_cue {
                InvalidCuePolicy::Skip => return Err(RowError::CueFormat(row.cue.clone())),
                InvalidCuePolicy::TreatAsAbsent => {
                    tracing::debug!(movie = %row.movie, cue = %row.cue, "Malformed cue treated as absent");
                    None
                }
            },
        };

        let category = match self.resolve_mode {
            ResolveMode::Single => self.resolver.resolve(&row.movie)?,
            ResolveMode::Combined => {
                let primary = row
                    .category_pk
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .ok_or(RowError::MissingPrimary)?;
                self.resolver.resolve_combined(primary, &row.movie)?
            }
        };

        let pk = self.pk.take().ok_or(RowError::PkExhausted)?;
        Ok(self.assembler.assemble(category, cue, type_value, pk))
    }
}
