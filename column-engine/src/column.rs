//! FILENAME: column-engine/src/column.rs
//! PURPOSE: The leaf unit of the column model.
//! CONTEXT: A Column pairs its declared definition with the live state the
//! model maintains for it: width, visibility, pin flag and aggregation role.
//! Only the model mutates a Column; collaborators get shared references.

use std::borrow::Borrow;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::definition::{AggFunc, ColumnDefinition, HeaderGroupShow};
use crate::options::GridOptions;

/// Stable identity of a column, derived from its definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        ColumnId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ColumnId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        ColumnId(id.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(id: String) -> Self {
        ColumnId(id)
    }
}

/// Hands out unique ids while a definition forest is being built.
///
/// Precedence is `col_id`, then `field`, then a generated `col_<n>`.
/// A taken id gets the first free `_<n>` suffix.
#[derive(Debug, Default)]
pub struct ColumnIdAllocator {
    used: FxHashSet<String>,
    generated: usize,
}

impl ColumnIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, definition: &ColumnDefinition) -> ColumnId {
        let base = match definition.col_id.as_ref().or(definition.field.as_ref()) {
            Some(base) => base.clone(),
            None => {
                let id = format!("col_{}", self.generated);
                self.generated += 1;
                id
            }
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        ColumnId(candidate)
    }
}

// ============================================================================
// COLUMN
// ============================================================================

#[derive(Debug, Clone)]
pub struct Column {
    id: ColumnId,
    definition: ColumnDefinition,
    actual_width: u32,
    min_width: u32,
    pub(crate) visible: bool,
    pub(crate) pinned: bool,
    pub(crate) agg_func: Option<AggFunc>,
    pub(crate) display_index: Option<usize>,
}

impl Column {
    /// Creates a column with its initial width resolved against the options:
    /// missing or zero width uses the grid default, anything outside the
    /// column's bounds is clamped.
    pub fn new(id: ColumnId, definition: ColumnDefinition, options: &GridOptions) -> Self {
        let min_width = definition
            .min_width
            .unwrap_or(0)
            .max(options.min_width_floor());

        let requested = match definition.width {
            Some(width) if width > 0 => width,
            _ => options.default_col_width(),
        };

        let mut column = Column {
            id,
            visible: !definition.hide,
            pinned: false,
            agg_func: definition.agg_func.clone(),
            display_index: None,
            actual_width: min_width,
            min_width,
            definition,
        };
        column.actual_width = column.clamp_width(requested);
        column
    }

    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    pub fn definition(&self) -> &ColumnDefinition {
        &self.definition
    }

    pub fn actual_width(&self) -> u32 {
        self.actual_width
    }

    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    /// Upper bound, never below the minimum. `None` means unbounded.
    pub fn max_width(&self) -> Option<u32> {
        self.definition.max_width.map(|max| max.max(self.min_width))
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn agg_func(&self) -> Option<&AggFunc> {
        self.agg_func.as_ref()
    }

    /// Position among the visible columns, `None` while not visible.
    pub fn display_index(&self) -> Option<usize> {
        self.display_index
    }

    pub fn suppress_size_to_fit(&self) -> bool {
        self.definition.suppress_size_to_fit
    }

    pub fn header_group_show(&self) -> Option<HeaderGroupShow> {
        self.definition.header_group_show
    }

    pub fn is_greater_than_max(&self, width: u32) -> bool {
        self.max_width().is_some_and(|max| width > max)
    }

    pub fn is_width_in_bounds(&self, width: u32) -> bool {
        width >= self.min_width && !self.is_greater_than_max(width)
    }

    pub fn clamp_width(&self, width: u32) -> u32 {
        let width = width.max(self.min_width);
        match self.max_width() {
            Some(max) => width.min(max),
            None => width,
        }
    }

    /// Sets the width, clamped to the column's bounds. Returns true if it changed.
    pub(crate) fn set_actual_width(&mut self, width: u32) -> bool {
        let width = self.clamp_width(width);
        let changed = width != self.actual_width;
        self.actual_width = width;
        changed
    }

    pub(crate) fn set_minimum(&mut self) {
        self.actual_width = self.min_width;
    }
}
