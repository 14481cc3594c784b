//! Output record assembly
//!
//! The field set of a record depends on whether the row carried a cue:
//!
//! ```text
//! cue present            name, category_data_movements_id, start_time, end_time,
//!                        related_explanation_slug, type
//! cue absent (related)   name, category_data_movements_id,
//!                        related_explanation_slug, type, is_related_only
//! cue absent (zero-fill) same keys as "cue present", start 0 / end sentinel
//! ```
//!
//! Key order in the serialized document follows the struct declaration order
//! of [`MovementFields`]; optional keys are omitted, never written as null.

use crate::config::{FieldOrderPolicy, PipelineConfig};
use crate::cue::CueRange;
use crate::lookup::Pk;
use crate::resolver::CategoryRecord;
use serde::{Deserialize, Serialize};

/// One fixture object: `{ "model": ..., "pk": ..., "fields": {...} }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub model: String,
    pub pk: u64,
    pub fields: MovementFields,
}

/// Fields of a category-movement fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFields {
    pub name: String,
    pub category_data_movements_id: Pk,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    pub related_explanation_slug: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_related_only: Option<bool>,
}

impl MovementFields {
    /// True for the relation-only shape (no timing)
    pub fn is_related_only(&self) -> bool {
        self.is_related_only == Some(true)
    }
}

/// Builds output records according to the flavor's record-shape options
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    model: String,
    slug_suffix: String,
    field_order: FieldOrderPolicy,
    end_sentinel: i64,
}

impl RecordAssembler {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            model: config.model.clone(),
            slug_suffix: config.slug_suffix.clone(),
            field_order: config.field_order,
            end_sentinel: config.end_sentinel,
        }
    }

    /// Assemble one record
    pub fn assemble(
        &self,
        category: CategoryRecord,
        cue: Option<CueRange>,
        type_value: &str,
        pk: u64,
    ) -> OutputRecord {
        let (start_time, end_time, is_related_only) = match (cue, self.field_order) {
            (Some(range), _) => (Some(range.start), Some(range.end), None),
            (None, FieldOrderPolicy::RelatedOnly) => (None, None, Some(true)),
            (None, FieldOrderPolicy::ZeroFilled) => (Some(0), Some(self.end_sentinel), None),
        };

        OutputRecord {
            model: self.model.clone(),
            pk,
            fields: MovementFields {
                name: category.name,
                category_data_movements_id: category.category_key,
                start_time,
                end_time,
                related_explanation_slug: format!("{}{}", category.slug, self.slug_suffix),
                kind: type_value.to_string(),
                is_related_only,
            },
        }
    }
}
