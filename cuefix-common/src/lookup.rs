//! Lookup index over the three auxiliary fixture tables
//!
//! Each table is a fixture document: a JSON array of `{ "pk": ..., "fields": {...} }`
//! objects. The index is built once per run and is read-only afterwards.
//!
//! | Table      | Required field          | Mapping                    |
//! |------------|-------------------------|----------------------------|
//! | paths      | `fields.path`           | ordered (path, pk) list    |
//! | data       | `fields.category_id`    | pk → category id           |
//! | categories | `fields.name`, `.slug`  | category id → name + slug  |
//!
//! Numeric keys compare by value: `7.0` and `7` are the same key, and unsigned
//! keys above `i64::MAX` are accepted. A fractional key such as `7.5` is
//! rejected as malformed.

use crate::fixture_io::load_json_table;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Opaque primary key as found in the fixture tables
///
/// Numeric and string keys never compare equal (`7` is not `"7"`). A numeric
/// key is held in its narrowest integral form, so integral floats serialize
/// back out as integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pk {
    Int(i64),
    /// Only for values above `i64::MAX`
    UInt(u64),
    Str(String),
}

impl Pk {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Pk::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Pk::UInt(u))
                } else {
                    n.as_f64().and_then(Self::from_integral_float)
                }
            }
            Value::String(s) => Some(Pk::Str(s.clone())),
            _ => None,
        }
    }

    fn from_integral_float(f: f64) -> Option<Self> {
        if f.fract() != 0.0 || !f.is_finite() {
            return None;
        }
        // 2^63 and 2^64 are exact in f64; the ranges are half-open
        if f >= -(2f64.powi(63)) && f < 2f64.powi(63) {
            Some(Pk::Int(f as i64))
        } else if f >= 0.0 && f < 2f64.powi(64) {
            Some(Pk::UInt(f as u64))
        } else {
            None
        }
    }
}

impl fmt::Display for Pk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pk::Int(n) => write!(f, "{}", n),
            Pk::UInt(n) => write!(f, "{}", n),
            Pk::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for Pk {
    fn from(value: i64) -> Self {
        Pk::Int(value)
    }
}

impl From<&str> for Pk {
    fn from(value: &str) -> Self {
        Pk::Str(value.to_string())
    }
}

/// Name and slug of a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub slug: String,
}

/// Locations of the three lookup table files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    /// Path → pk table (the "urls" table)
    pub paths: PathBuf,
    /// Pk → category id table
    pub data: PathBuf,
    /// Category id → name/slug table
    pub categories: PathBuf,
}

/// In-memory lookup index, immutable after construction
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    path_index: Vec<(String, Pk)>,
    key_to_category_id: HashMap<Pk, Pk>,
    category_by_id: HashMap<Pk, CategoryEntry>,
}

impl LookupTables {
    /// Build the index from three parsed fixture documents
    ///
    /// Fails with [`Error::MalformedInput`] naming the table and entry index
    /// when a document is not an array of `{pk, fields}` objects carrying the
    /// required fields. Where a pk repeats in the data or categories table the
    /// first entry wins, matching a first-match scan of the table.
    pub fn load(path_table: &Value, data_table: &Value, category_table: &Value) -> Result<Self> {
        let mut tables = LookupTables::default();

        for (idx, entry) in entries("paths", path_table)?.iter().enumerate() {
            let (pk, fields) = split_entry("paths", idx, entry)?;
            let path = string_field("paths", idx, fields, "path")?;
            tables.path_index.push((path, pk));
        }

        for (idx, entry) in entries("data", data_table)?.iter().enumerate() {
            let (pk, fields) = split_entry("data", idx, entry)?;
            let category_id = fields
                .get("category_id")
                .and_then(Pk::from_value)
                .ok_or_else(|| {
                    Error::malformed("data", format!("entry {}: missing or invalid fields.category_id", idx))
                })?;
            tables.key_to_category_id.entry(pk).or_insert(category_id);
        }

        for (idx, entry) in entries("categories", category_table)?.iter().enumerate() {
            let (pk, fields) = split_entry("categories", idx, entry)?;
            let name = string_field("categories", idx, fields, "name")?;
            let slug = string_field("categories", idx, fields, "slug")?;
            tables
                .category_by_id
                .entry(pk)
                .or_insert(CategoryEntry { name, slug });
        }

        tracing::debug!(
            paths = tables.path_index.len(),
            data = tables.key_to_category_id.len(),
            categories = tables.category_by_id.len(),
            "Lookup tables loaded"
        );

        Ok(tables)
    }

    /// Read the three table files and build the index
    pub fn from_files(paths: &TablePaths) -> Result<Self> {
        let path_table = load_json_table(&paths.paths)?;
        let data_table = load_json_table(&paths.data)?;
        let category_table = load_json_table(&paths.categories)?;
        Self::load(&path_table, &data_table, &category_table)
    }

    /// First path-index key whose recorded path contains `filename`
    pub fn key_for_path(&self, filename: &str) -> Option<&Pk> {
        self.path_index
            .iter()
            .find(|(path, _)| path.contains(filename))
            .map(|(_, pk)| pk)
    }

    /// Category id for a path-index key
    pub fn category_id_for_key(&self, key: &Pk) -> Option<&Pk> {
        self.key_to_category_id.get(key)
    }

    /// Category name and slug for a category id
    pub fn category(&self, category_id: &Pk) -> Option<&CategoryEntry> {
        self.category_by_id.get(category_id)
    }

    /// Number of entries in the path index
    pub fn path_count(&self) -> usize {
        self.path_index.len()
    }
}

fn entries<'a>(table: &str, doc: &'a Value) -> Result<&'a Vec<Value>> {
    doc.as_array()
        .ok_or_else(|| Error::malformed(table, "expected a JSON array of records"))
}

fn split_entry<'a>(
    table: &str,
    idx: usize,
    entry: &'a Value,
) -> Result<(Pk, &'a serde_json::Map<String, Value>)> {
    let pk = entry
        .get("pk")
        .and_then(Pk::from_value)
        .ok_or_else(|| Error::malformed(table, format!("entry {}: missing or invalid pk", idx)))?;
    let fields = entry
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed(table, format!("entry {}: missing fields object", idx)))?;
    Ok((pk, fields))
}

fn string_field(
    table: &str,
    idx: usize,
    fields: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::malformed(table, format!("entry {}: missing or non-string fields.{}", idx, name))
        })
}
