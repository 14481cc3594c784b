//! File collaborators: cue CSV reader, JSON table loader, fixture sink

use crate::assembler::OutputRecord;
use crate::config::ResolveMode;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Columns every cue CSV must carry
pub const REQUIRED_COLUMNS: &[&str] = &["type", "movie", "cue"];

/// Columns a cue CSV must carry for combined resolution
pub const COMBINED_REQUIRED_COLUMNS: &[&str] = &["type", "movie", "cue", "category_pk"];

/// Header columns the CSV must carry for a resolution mode
pub fn required_columns(mode: ResolveMode) -> &'static [&'static str] {
    match mode {
        ResolveMode::Single => REQUIRED_COLUMNS,
        ResolveMode::Combined => COMBINED_REQUIRED_COLUMNS,
    }
}

/// One row of the cue CSV
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Movement type, e.g. SEQUENCE (whitespace trimmed by the pipeline)
    pub kind: String,
    /// Filename resolved against the path table
    pub movie: String,
    /// Free-text time range
    pub cue: String,
    /// Primary filename in combined mode; `None` when the column is absent or the cell empty
    pub category_pk: Option<String>,
    /// 1-based line number in the source file (0 when built in memory)
    pub line: u64,
}

impl RawRow {
    /// Build a row in memory
    pub fn new(kind: &str, movie: &str, cue: &str) -> Self {
        Self {
            kind: kind.to_string(),
            movie: movie.to_string(),
            cue: cue.to_string(),
            category_pk: None,
            line: 0,
        }
    }

    /// Attach a combined-mode primary filename
    pub fn with_category_pk(mut self, category_pk: &str) -> Self {
        self.category_pk = Some(category_pk.to_string());
        self
    }
}

/// Read all rows of a cue CSV file, checking the header for `required` columns
pub fn read_cue_rows(path: &Path, required: &[&str]) -> Result<Vec<RawRow>> {
    let file = File::open(path)?;
    let rows = read_cue_rows_requiring(BufReader::new(file), required)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Read cue CSV");
    Ok(rows)
}

/// Read all rows of a cue CSV from any reader, requiring the base columns
pub fn read_cue_rows_from<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    read_cue_rows_requiring(reader, REQUIRED_COLUMNS)
}

/// Read all rows of a cue CSV from any reader
///
/// Fails with [`Error::MalformedInput`] when a `required` column is absent
/// from the header. Short rows are accepted; missing trailing cells read as
/// empty.
pub fn read_cue_rows_requiring<R: Read>(reader: R, required: &[&str]) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| column(col).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(Error::malformed(
            "cue CSV",
            format!("missing column(s): {}", missing.join(", ")),
        ));
    }

    let idx_type = column("type");
    let idx_movie = column("movie");
    let idx_cue = column("cue");
    let idx_category_pk = column("category_pk");

    let cell = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
    };

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let category_pk = cell(&record, idx_category_pk);
        rows.push(RawRow {
            kind: cell(&record, idx_type),
            movie: cell(&record, idx_movie),
            cue: cell(&record, idx_cue),
            category_pk: (!category_pk.is_empty()).then_some(category_pk),
            line: record.position().map(|p| p.line()).unwrap_or(0),
        });
    }
    Ok(rows)
}

/// Read and parse one JSON lookup table
pub fn load_json_table(path: &Path) -> Result<serde_json::Value> {
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

/// Render records as the fixture document (2-space indent, trailing newline)
pub fn render_fixture(records: &[OutputRecord]) -> Result<String> {
    let mut text = serde_json::to_string_pretty(records)?;
    text.push('\n');
    Ok(text)
}

/// Write the fixture document atomically
///
/// The document goes to `<output>.tmp` beside the target and is renamed over
/// it once fully flushed, so the target never holds a partial document.
pub fn write_fixture(records: &[OutputRecord], output: &Path) -> Result<()> {
    let text = render_fixture(records)?;
    let tmp = temp_path(output);

    let write = || -> Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp, output)?;
        Ok(())
    };

    if let Err(e) = write() {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    tracing::debug!(path = %output.display(), records = records.len(), "Fixture written");
    Ok(())
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "fixture.json".into());
    name.push(".tmp");
    output.with_file_name(name)
}
