//! FILENAME: column-engine/src/definition.rs
//! Column Definitions - The declarative input forest.
//!
//! This module contains everything needed to DESCRIBE the columns of a grid:
//! - Leaf definitions (a field binding with width and aggregation hints)
//! - Header group definitions (a named node with `subHeaders`)
//!
//! Definitions are never mutated by the model after setup, with one exception:
//! deprecated fields are migrated once, when a definition forest is installed.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Aggregation role of a value column.
///
/// `Sum`, `Min` and `Max` are the built-ins the model recognizes when a state
/// snapshot is restored. Any other name is carried as `Custom` and left for the
/// row model to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggFunc {
    Sum,
    Min,
    Max,
    Custom(String),
}

impl AggFunc {
    /// Parses one of the built-in names; `None` for anything else.
    pub fn builtin(name: &str) -> Option<AggFunc> {
        match name {
            "sum" => Some(AggFunc::Sum),
            "min" => Some(AggFunc::Min),
            "max" => Some(AggFunc::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, AggFunc::Custom(_))
    }
}

impl Default for AggFunc {
    fn default() -> Self {
        AggFunc::Sum
    }
}

impl From<String> for AggFunc {
    fn from(name: String) -> Self {
        AggFunc::builtin(&name).unwrap_or(AggFunc::Custom(name))
    }
}

impl From<AggFunc> for String {
    fn from(agg: AggFunc) -> Self {
        agg.as_str().to_string()
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// HEADER GROUP VISIBILITY
// ============================================================================

/// Restricts a column to one expand state of its parent header group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderGroupShow {
    /// Shown only while the parent group is expanded.
    Open,
    /// Shown only while the parent group is collapsed (summary column).
    Closed,
}

// ============================================================================
// HEADER NAME RESOLUTION
// ============================================================================

/// Arguments handed to a header value getter.
#[derive(Debug, Clone, Copy)]
pub struct HeaderValueParams<'a> {
    pub definition: &'a ColumnDefinition,
    pub context: Option<&'a serde_json::Value>,
}

/// Computes the header text of a column at display time.
#[derive(Clone)]
pub enum HeaderValueGetter {
    /// Called directly.
    Function(Rc<dyn Fn(&HeaderValueParams) -> String>),
    /// Handed to the host's expression evaluator.
    Expression(String),
}

impl HeaderValueGetter {
    pub fn function(f: impl Fn(&HeaderValueParams) -> String + 'static) -> Self {
        HeaderValueGetter::Function(Rc::new(f))
    }
}

/// Host collaborator that evaluates `HeaderValueGetter::Expression` getters.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &str, params: &HeaderValueParams) -> String;
}

impl fmt::Debug for HeaderValueGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValueGetter::Function(_) => f.write_str("Function(..)"),
            HeaderValueGetter::Expression(expr) => f.debug_tuple("Expression").field(expr).finish(),
        }
    }
}

// ============================================================================
// COLUMN DEFINITION
// ============================================================================

/// One node of the column definition forest.
///
/// A node with `sub_headers` (even an empty list) is a header group; anything
/// else is a leaf column bound to `field`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Explicit id. Takes precedence over `field` when deriving the column id.
    #[serde(default)]
    pub col_id: Option<String>,

    /// Row data field this column is bound to.
    #[serde(default)]
    pub field: Option<String>,

    /// Static header text (also the group name for header groups).
    #[serde(default)]
    pub header_name: Option<String>,

    /// Deprecated: replaced by `header_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Computes the header text at display time. Not serialized.
    #[serde(skip)]
    pub header_value_getter: Option<HeaderValueGetter>,

    /// Initial width in pixels. Missing or zero means the grid default.
    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub min_width: Option<u32>,

    #[serde(default)]
    pub max_width: Option<u32>,

    /// Exempt from fit-to-width.
    #[serde(default)]
    pub suppress_size_to_fit: bool,

    /// Pinned by default (seeds the pin flag of header groups).
    #[serde(default)]
    pub pinned: bool,

    /// Initially hidden.
    #[serde(default)]
    pub hide: bool,

    /// Explicit aggregation. Columns carrying one start as value columns.
    #[serde(default)]
    pub agg_func: Option<AggFunc>,

    #[serde(default)]
    pub header_group_show: Option<HeaderGroupShow>,

    /// Deprecated: replaced by `header_group_show`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_show: Option<HeaderGroupShow>,

    /// Children of a header group.
    #[serde(default)]
    pub sub_headers: Option<Vec<ColumnDefinition>>,
}

impl ColumnDefinition {
    /// A leaf column bound to `field`.
    pub fn leaf(field: impl Into<String>) -> Self {
        ColumnDefinition {
            field: Some(field.into()),
            ..Default::default()
        }
    }

    /// A header group named `name`.
    pub fn group(name: impl Into<String>, children: Vec<ColumnDefinition>) -> Self {
        ColumnDefinition {
            header_name: Some(name.into()),
            sub_headers: Some(children),
            ..Default::default()
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_agg_func(mut self, agg_func: AggFunc) -> Self {
        self.agg_func = Some(agg_func);
        self
    }

    pub fn with_header_group_show(mut self, show: HeaderGroupShow) -> Self {
        self.header_group_show = Some(show);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    pub fn suppress_size_to_fit(mut self) -> Self {
        self.suppress_size_to_fit = true;
        self
    }

    pub fn is_group(&self) -> bool {
        self.sub_headers.is_some()
    }

    pub fn children(&self) -> &[ColumnDefinition] {
        self.sub_headers.as_deref().unwrap_or(&[])
    }

    /// Nesting depth: 0 for a leaf, 1 + deepest child for a group.
    pub fn depth(&self) -> usize {
        match &self.sub_headers {
            None => 0,
            Some(children) => 1 + children.iter().map(|c| c.depth()).max().unwrap_or(0),
        }
    }

    /// Label used in logs for a definition that may not have an id yet.
    pub(crate) fn describe(&self) -> &str {
        self.col_id
            .as_deref()
            .or(self.field.as_deref())
            .or(self.header_name.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// Deepest nesting over a whole definition forest.
pub fn max_depth(defs: &[ColumnDefinition]) -> usize {
    defs.iter().map(|d| d.depth()).max().unwrap_or(0)
}

/// Moves deprecated fields to their replacements, recursively.
/// An explicitly set replacement field wins over the deprecated one.
pub fn migrate_deprecated(defs: &mut [ColumnDefinition]) {
    for def in defs.iter_mut() {
        if let Some(show) = def.group_show.take() {
            log::warn!(
                "{}: group_show is deprecated, please use header_group_show",
                def.describe()
            );
            def.header_group_show.get_or_insert(show);
        }
        if let Some(name) = def.display_name.take() {
            log::warn!(
                "{}: display_name {} is deprecated, please use header_name",
                def.describe(),
                name
            );
            def.header_name.get_or_insert(name);
        }
        if let Some(children) = def.sub_headers.as_mut() {
            migrate_deprecated(children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_of_leaf_and_groups() {
        let leaf = ColumnDefinition::leaf("a");
        assert_eq!(leaf.depth(), 0);

        let empty = ColumnDefinition::group("E", vec![]);
        assert_eq!(empty.depth(), 1);

        let nested = ColumnDefinition::group(
            "Outer",
            vec![
                ColumnDefinition::leaf("a"),
                ColumnDefinition::group("Inner", vec![ColumnDefinition::leaf("b")]),
            ],
        );
        assert_eq!(nested.depth(), 2);
        assert_eq!(max_depth(&[leaf, nested]), 2);
        assert_eq!(max_depth(&[]), 0);
    }

    #[test]
    fn test_agg_func_parsing() {
        assert_eq!(AggFunc::builtin("sum"), Some(AggFunc::Sum));
        assert_eq!(AggFunc::builtin("avg"), None);
        assert_eq!(AggFunc::from("max".to_string()), AggFunc::Max);
        assert_eq!(AggFunc::from("median".to_string()), AggFunc::Custom("median".to_string()));
        assert!(!AggFunc::Custom("median".to_string()).is_builtin());
    }

    #[test]
    fn test_migrate_deprecated_fields() {
        let mut defs = vec![ColumnDefinition::group(
            "G",
            vec![ColumnDefinition {
                field: Some("a".to_string()),
                display_name: Some("Alpha".to_string()),
                group_show: Some(HeaderGroupShow::Closed),
                ..Default::default()
            }],
        )];
        migrate_deprecated(&mut defs);

        let child = &defs[0].children()[0];
        assert_eq!(child.header_name.as_deref(), Some("Alpha"));
        assert_eq!(child.header_group_show, Some(HeaderGroupShow::Closed));
        assert!(child.display_name.is_none());
        assert!(child.group_show.is_none());
    }

    #[test]
    fn test_migration_keeps_explicit_replacement() {
        let mut defs = vec![ColumnDefinition {
            field: Some("a".to_string()),
            header_name: Some("New".to_string()),
            display_name: Some("Old".to_string()),
            ..Default::default()
        }];
        migrate_deprecated(&mut defs);
        assert_eq!(defs[0].header_name.as_deref(), Some("New"));
    }

    #[test]
    fn test_definition_from_json() {
        let json = r#"[
            {"headerName": "Sales", "subHeaders": [
                {"field": "q1", "width": 80, "aggFunc": "sum"},
                {"field": "q2", "headerGroupShow": "open", "suppressSizeToFit": true}
            ]},
            {"field": "region", "pinned": true}
        ]"#;
        let defs: Vec<ColumnDefinition> = serde_json::from_str(json).unwrap();
        assert!(defs[0].is_group());
        assert_eq!(defs[0].children()[0].agg_func, Some(AggFunc::Sum));
        assert_eq!(defs[0].children()[1].header_group_show, Some(HeaderGroupShow::Open));
        assert!(defs[0].children()[1].suppress_size_to_fit);
        assert!(!defs[1].is_group());
        assert!(defs[1].pinned);
    }
}
