//! Category resolution: filename → category record
//!
//! Chains the three lookups of [`LookupTables`]:
//! 1. path index (substring match, first entry in table order wins)
//! 2. key → category id
//! 3. category id → name + slug
//!
//! Each stage short-circuits with a [`ResolutionError`] naming the stage.
//!
//! Path matching is containment, not equality. A filename that appears inside
//! several recorded paths resolves to whichever comes first in the table, and
//! an empty filename matches the first path entry. Existing inputs rely on the
//! permissive match, so it is kept.

use crate::error::{FileRole, LookupStage, ResolutionError};
use crate::lookup::{LookupTables, Pk};

/// Category data resolved for one cue row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub name: String,
    pub slug: String,
    /// Path-index key, emitted as `category_data_movements_id`
    pub category_key: Pk,
}

/// Resolves filenames against a borrowed lookup index
#[derive(Debug, Clone, Copy)]
pub struct CategoryResolver<'a> {
    tables: &'a LookupTables,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(tables: &'a LookupTables) -> Self {
        Self { tables }
    }

    /// Resolve a single filename
    pub fn resolve(&self, filename: &str) -> Result<CategoryRecord, ResolutionError> {
        self.resolve_as(filename, FileRole::Primary)
    }

    /// Resolve two filenames and mix the results
    ///
    /// `name` and `slug` come from `secondary`; `category_key` comes from
    /// `primary`. The primary is resolved first, so when both would fail the
    /// primary's failure is the one reported.
    pub fn resolve_combined(
        &self,
        primary: &str,
        secondary: &str,
    ) -> Result<CategoryRecord, ResolutionError> {
        let first = self.resolve_as(primary, FileRole::Primary)?;
        let second = self.resolve_as(secondary, FileRole::Secondary)?;

        Ok(CategoryRecord {
            name: second.name,
            slug: second.slug,
            category_key: first.category_key,
        })
    }

    fn resolve_as(&self, filename: &str, role: FileRole) -> Result<CategoryRecord, ResolutionError> {
        let fail = |stage: LookupStage, key: String| ResolutionError {
            file: filename.to_string(),
            role,
            stage,
            key,
        };

        let key = self
            .tables
            .key_for_path(filename)
            .ok_or_else(|| fail(LookupStage::Path, filename.to_string()))?;

        let category_id = self
            .tables
            .category_id_for_key(key)
            .ok_or_else(|| fail(LookupStage::CategoryId, key.to_string()))?;

        let entry = self
            .tables
            .category(category_id)
            .ok_or_else(|| fail(LookupStage::Category, category_id.to_string()))?;

        tracing::trace!(file = %filename, key = %key, category_id = %category_id, "Resolved category");

        Ok(CategoryRecord {
            name: entry.name.clone(),
            slug: entry.slug.clone(),
            category_key: key.clone(),
        })
    }
}
