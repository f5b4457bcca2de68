//! FILENAME: column-engine/src/store.rs
//! PURPOSE: Root state of the column model.
//! CONTEXT: Everything in here is authoritative. The visible, displayed and
//! group views are never stored here; they are derived from this state by
//! `view::derive_views` after every mutation.

use rustc_hash::FxHashMap;

use crate::column::{Column, ColumnId};
use crate::definition::ColumnDefinition;
use crate::group::{ColumnGroup, GroupKey};
use crate::options::GridOptions;
use crate::tree::build_column_tree;

/// Id of the synthetic grouping column unless its definition names one.
pub const AUTO_GROUP_COLUMN_ID: &str = "auto-group-column";

#[derive(Debug, Default)]
pub struct ColumnStore {
    /// Every column the model owns, including the synthetic grouping column and
    /// placeholder pivot columns that have no definition.
    pub(crate) columns: FxHashMap<ColumnId, Column>,
    /// Canonical column order.
    pub(crate) all_columns: Vec<ColumnId>,
    /// Balanced header forest before pin splitting.
    pub(crate) all_columns_in_groups: Vec<ColumnGroup>,
    /// Breakdown order.
    pub(crate) pivot_columns: Vec<ColumnId>,
    pub(crate) value_columns: Vec<ColumnId>,
    pub(crate) pinned_column_count: usize,
    /// Expand state of named groups. Missing means expanded.
    pub(crate) group_state: FxHashMap<GroupKey, bool>,
    pub(crate) group_column: Option<ColumnId>,
}

impl ColumnStore {
    /// Builds root state wholesale from the options' definitions.
    pub fn build(options: &GridOptions) -> Self {
        let tree = build_column_tree(&options.column_defs, options);
        let all_columns = tree.column_ids();

        let mut columns: FxHashMap<ColumnId, Column> = FxHashMap::default();
        for column in tree.columns {
            columns.insert(column.id().clone(), column);
        }

        let value_columns = all_columns
            .iter()
            .filter(|id| columns.get(*id).is_some_and(|c| c.agg_func().is_some()))
            .cloned()
            .collect();

        let mut store = ColumnStore {
            columns,
            all_columns,
            all_columns_in_groups: tree.groups,
            pivot_columns: Vec::new(),
            value_columns,
            pinned_column_count: options.pinned_col_count(),
            group_state: FxHashMap::default(),
            group_column: None,
        };
        store.create_pivot_columns(options);
        store
    }

    /// Resolves the configured group keys. Keys without a column get a
    /// placeholder column that is pivoted on but never displayed.
    fn create_pivot_columns(&mut self, options: &GridOptions) {
        for key in &options.group_keys {
            if self.pivot_columns.iter().any(|id| id.as_str() == key) {
                continue;
            }
            if !self.columns.contains_key(key.as_str()) {
                let definition = ColumnDefinition {
                    field: Some(key.clone()),
                    header_name: Some(key.clone()),
                    ..Default::default()
                };
                let id = ColumnId::new(key.clone());
                self.columns.insert(id.clone(), Column::new(id, definition, options));
            }
            self.pivot_columns.push(ColumnId::new(key.clone()));
        }
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.get(id)
    }

    pub(crate) fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.get_mut(id)
    }

    pub fn is_in_all_columns(&self, id: &str) -> bool {
        self.all_columns.iter().any(|c| c.as_str() == id)
    }

    pub fn is_pivot(&self, id: &str) -> bool {
        self.pivot_columns.iter().any(|c| c.as_str() == id)
    }

    pub fn is_value(&self, id: &str) -> bool {
        self.value_columns.iter().any(|c| c.as_str() == id)
    }

    /// Replaces the synthetic grouping column with a fresh one built from
    /// `definition`, or drops it when `definition` is `None`. A user-set width
    /// carries over to the replacement.
    pub(crate) fn replace_group_column(
        &mut self,
        definition: Option<ColumnDefinition>,
        options: &GridOptions,
    ) -> Option<ColumnId> {
        let previous = self
            .group_column
            .take()
            .and_then(|old| self.columns.remove(&old));
        let definition = definition?;

        let base = definition
            .col_id
            .clone()
            .or_else(|| definition.field.clone())
            .unwrap_or_else(|| AUTO_GROUP_COLUMN_ID.to_string());
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.columns.contains_key(candidate.as_str()) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        let id = ColumnId::new(candidate);
        let mut column = Column::new(id.clone(), definition, options);
        if let Some(previous) = previous {
            column.set_actual_width(previous.actual_width());
        }
        self.columns.insert(id.clone(), column);
        self.group_column = Some(id.clone());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AggFunc;

    #[test]
    fn test_build_collects_value_columns() {
        let options = GridOptions::new(vec![
            ColumnDefinition::leaf("region"),
            ColumnDefinition::leaf("sales").with_agg_func(AggFunc::Sum),
            ColumnDefinition::leaf("cost").with_agg_func(AggFunc::Max),
        ]);
        let store = ColumnStore::build(&options);
        assert_eq!(store.all_columns.len(), 3);
        assert_eq!(store.value_columns, vec![ColumnId::from("sales"), ColumnId::from("cost")]);
        assert!(store.is_value("sales"));
        assert!(!store.is_value("region"));
    }

    #[test]
    fn test_unknown_group_key_creates_placeholder() {
        let mut options = GridOptions::new(vec![ColumnDefinition::leaf("region")]);
        options.group_keys = vec!["region".to_string(), "country".to_string(), "region".to_string()];
        let store = ColumnStore::build(&options);

        assert_eq!(store.pivot_columns, vec![ColumnId::from("region"), ColumnId::from("country")]);
        assert!(store.column("country").is_some());
        assert!(!store.is_in_all_columns("country"));
    }

    #[test]
    fn test_group_column_id_avoids_collision() {
        let options = GridOptions::new(vec![ColumnDefinition::leaf(AUTO_GROUP_COLUMN_ID)]);
        let mut store = ColumnStore::build(&options);
        let id = store
            .replace_group_column(Some(ColumnDefinition::default()), &options)
            .unwrap();
        assert_eq!(id.as_str(), "auto-group-column_1");
        assert!(store.column(AUTO_GROUP_COLUMN_ID).is_some());

        assert!(store.replace_group_column(None, &options).is_none());
        assert!(store.column("auto-group-column_1").is_none());
        assert!(store.column(AUTO_GROUP_COLUMN_ID).is_some());
    }
}
