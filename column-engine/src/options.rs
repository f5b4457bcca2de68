//! FILENAME: column-engine/src/options.rs
//! PURPOSE: Grid configuration consumed by the column model.
//! CONTEXT: Passed in once at construction. The model only reads it through
//! the narrow accessors below; it never consults ambient global settings.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::definition::ColumnDefinition;

/// Width given to columns whose definition carries none.
pub const DEFAULT_COL_WIDTH: u32 = 200;

/// Floor applied to every column's minimum width.
pub const MIN_COL_WIDTH: u32 = 10;

/// Resolves a translatable string: `(key, default) -> text`.
pub type LocaleTextFn = Rc<dyn Fn(&str, &str) -> String>;

/// Options controlling how the column model builds and derives its views.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    /// The column definition forest.
    #[serde(default)]
    pub column_defs: Vec<ColumnDefinition>,

    /// Number of leading visible columns pinned to the left. Negative values
    /// are treated as zero.
    #[serde(default)]
    pub pinned_column_count: i64,

    /// Build a header group tree from `subHeaders`.
    #[serde(default)]
    pub group_headers: bool,

    /// Hide pivot columns from the body.
    #[serde(default)]
    pub group_hide_pivot_columns: bool,

    /// Never insert the synthetic grouping column.
    #[serde(default)]
    pub group_suppress_auto_column: bool,

    /// Grouped rows span the entire row, so no grouping column is needed.
    #[serde(default)]
    pub group_use_entire_row: bool,

    /// Group rows are not rendered at all.
    #[serde(default)]
    pub group_suppress_row: bool,

    /// Definition for the synthetic grouping column. A default one is made
    /// when absent.
    #[serde(default)]
    pub group_column_def: Option<ColumnDefinition>,

    /// Initial pivot columns, by column id.
    #[serde(default)]
    pub group_keys: Vec<String>,

    #[serde(default = "default_col_width")]
    pub col_width: u32,

    #[serde(default = "default_min_col_width")]
    pub min_col_width: u32,

    /// Opaque value handed to header value getters.
    #[serde(default)]
    pub context: Option<serde_json::Value>,

    #[serde(skip)]
    pub locale_text: Option<LocaleTextFn>,
}

fn default_col_width() -> u32 {
    DEFAULT_COL_WIDTH
}

fn default_min_col_width() -> u32 {
    MIN_COL_WIDTH
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            column_defs: Vec::new(),
            pinned_column_count: 0,
            group_headers: false,
            group_hide_pivot_columns: false,
            group_suppress_auto_column: false,
            group_use_entire_row: false,
            group_suppress_row: false,
            group_column_def: None,
            group_keys: Vec::new(),
            col_width: DEFAULT_COL_WIDTH,
            min_col_width: MIN_COL_WIDTH,
            context: None,
            locale_text: None,
        }
    }
}

impl fmt::Debug for GridOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridOptions")
            .field("column_defs", &self.column_defs.len())
            .field("pinned_column_count", &self.pinned_column_count)
            .field("group_headers", &self.group_headers)
            .field("group_hide_pivot_columns", &self.group_hide_pivot_columns)
            .field("group_keys", &self.group_keys)
            .field("col_width", &self.col_width)
            .field("min_col_width", &self.min_col_width)
            .finish_non_exhaustive()
    }
}

impl GridOptions {
    pub fn new(column_defs: Vec<ColumnDefinition>) -> Self {
        GridOptions {
            column_defs,
            ..Default::default()
        }
    }

    /// Pinned column count clamped to zero or greater.
    pub fn pinned_col_count(&self) -> usize {
        usize::try_from(self.pinned_column_count).unwrap_or(0)
    }

    /// Default width, never below the minimum.
    pub fn default_col_width(&self) -> u32 {
        self.col_width.max(self.min_width_floor())
    }

    /// Minimum width for every column. At least one pixel so proportional
    /// scaling never divides by zero.
    pub fn min_width_floor(&self) -> u32 {
        self.min_col_width.max(1)
    }

    pub fn is_group_headers(&self) -> bool {
        self.group_headers
    }

    pub fn is_group_hide_pivot_columns(&self) -> bool {
        self.group_hide_pivot_columns
    }

    /// Whether pivoting needs the synthetic grouping column at all.
    pub fn wants_auto_group_column(&self) -> bool {
        !self.group_suppress_auto_column && !self.group_use_entire_row && !self.group_suppress_row
    }

    pub fn locale_text(&self, key: &str, default: &str) -> String {
        match &self.locale_text {
            Some(lookup) => lookup(key, default),
            None => default.to_string(),
        }
    }
}
