//! FILENAME: column-engine/src/model.rs
//! PURPOSE: The column model: owns root state and exposes every operation.
//! CONTEXT: Each mutation validates its arguments, changes root state, runs the
//! view pipeline and then publishes one notification. A rejected mutation
//! changes nothing, logs a warning and returns the reason.

use std::fmt;

use crate::column::{Column, ColumnId};
use crate::definition::{migrate_deprecated, AggFunc, ColumnDefinition, ExpressionEvaluator, HeaderValueGetter, HeaderValueParams};
use crate::error::{rejected, ColumnError, ColumnResult};
use crate::events::{ColumnEvent, EventSink, NullSink};
use crate::group::{ColumnGroup, GroupKey};
use crate::options::GridOptions;
use crate::sizing;
use crate::state::{apply_state, capture_state, ColumnState, StateRestoreReport};
use crate::store::ColumnStore;
use crate::view::{derive_views, resolve, Views};

pub struct ColumnModel<S: EventSink = NullSink> {
    options: GridOptions,
    store: ColumnStore,
    views: Views,
    sink: S,
    expressions: Option<Box<dyn ExpressionEvaluator>>,
}

impl ColumnModel<NullSink> {
    /// Builds a model that publishes nowhere.
    pub fn new(options: GridOptions) -> Self {
        Self::with_sink(options, NullSink)
    }
}

impl<S: EventSink> fmt::Debug for ColumnModel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnModel")
            .field("options", &self.options)
            .field("store", &self.store)
            .field("views", &self.views)
            .field("expressions", &self.expressions.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: EventSink> ColumnModel<S> {
    // ========================================================================
    // SETUP
    // ========================================================================

    pub fn with_sink(mut options: GridOptions, sink: S) -> Self {
        normalize_definitions(&mut options);
        let mut store = ColumnStore::build(&options);
        let views = derive_views(&mut store, &options);
        let mut model = ColumnModel {
            options,
            store,
            views,
            sink,
            expressions: None,
        };
        model.sink.publish(ColumnEvent::EverythingChanged);
        model
    }

    /// Replaces the definition forest and rebuilds every column from scratch.
    /// The pinned column count is kept; expand state is not.
    pub fn set_column_definitions(&mut self, defs: Vec<ColumnDefinition>) {
        self.options.column_defs = defs;
        normalize_definitions(&mut self.options);

        let pinned = self.store.pinned_column_count;
        self.store = ColumnStore::build(&self.options);
        self.store.pinned_column_count = pinned;
        self.refresh();
        self.sink.publish(ColumnEvent::EverythingChanged);
    }

    pub fn set_expression_evaluator(&mut self, evaluator: impl ExpressionEvaluator + 'static) {
        self.expressions = Some(Box::new(evaluator));
    }

    fn refresh(&mut self) {
        self.views = derive_views(&mut self.store, &self.options);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Every column in canonical order. Excludes the grouping column.
    pub fn all_columns(&self) -> Vec<&Column> {
        resolve(&self.store, &self.store.all_columns).collect()
    }

    pub fn visible_columns(&self) -> Vec<&Column> {
        resolve(&self.store, &self.views.visible_columns).collect()
    }

    pub fn displayed_columns(&self) -> Vec<&Column> {
        resolve(&self.store, &self.views.displayed_columns).collect()
    }

    pub fn pivot_columns(&self) -> Vec<&Column> {
        resolve(&self.store, &self.store.pivot_columns).collect()
    }

    pub fn value_columns(&self) -> Vec<&Column> {
        resolve(&self.store, &self.store.value_columns).collect()
    }

    /// The pin-split header forest, `None` when header grouping is off.
    pub fn header_groups(&self) -> Option<&[ColumnGroup]> {
        self.views.column_groups.as_deref()
    }

    pub fn group_column(&self) -> Option<&Column> {
        self.store.group_column.as_ref().and_then(|id| self.store.column(id.as_str()))
    }

    fn is_group_column(&self, key: &str) -> bool {
        self.store.group_column.as_ref().is_some_and(|id| id.as_str() == key)
    }

    /// Looks a column up by id among all columns and the grouping column.
    pub fn get_column(&self, key: &str) -> Option<&Column> {
        if self.store.is_in_all_columns(key) || self.is_group_column(key) {
            self.store.column(key)
        } else {
            None
        }
    }

    /// Resolves several ids, skipping the unknown ones.
    pub fn get_columns<'a>(&'a self, keys: &[&str]) -> Vec<&'a Column> {
        keys.iter().filter_map(|key| self.get_column(key)).collect()
    }

    pub fn get_column_group(&self, key: &GroupKey) -> Option<&ColumnGroup> {
        self.views.find_group(key)
    }

    fn visible_neighbour(&self, key: &str, offset: isize) -> Option<&Column> {
        let index = self.get_column(key)?.display_index()?;
        let neighbour = index.checked_add_signed(offset)?;
        let id = self.views.visible_columns.get(neighbour)?;
        self.store.column(id.as_str())
    }

    /// The visible column immediately left of `key`.
    pub fn visible_col_before(&self, key: &str) -> Option<&Column> {
        self.visible_neighbour(key, -1)
    }

    /// The visible column immediately right of `key`.
    pub fn visible_col_after(&self, key: &str) -> Option<&Column> {
        self.visible_neighbour(key, 1)
    }

    pub fn pinned_column_count(&self) -> usize {
        self.store.pinned_column_count
    }

    pub fn is_pinning(&self) -> bool {
        resolve(&self.store, &self.views.visible_columns).any(|c| c.is_pinned())
    }

    /// Width of the displayed columns. `Some(true)` counts only pinned
    /// columns, `Some(false)` only unpinned ones.
    pub fn total_col_width(&self, pinned: Option<bool>) -> u32 {
        resolve(&self.store, &self.views.displayed_columns)
            .filter(|c| pinned.map_or(true, |p| c.is_pinned() == p))
            .fold(0u32, |total, c| total.saturating_add(c.actual_width()))
    }

    pub fn pinned_container_width(&self) -> u32 {
        self.total_col_width(Some(true))
    }

    pub fn body_container_width(&self) -> u32 {
        self.total_col_width(Some(false))
    }

    /// Header text of a column: its getter if it has one, then the header
    /// name, then the field, then the id.
    pub fn display_name_for_column(&self, key: &str) -> Option<String> {
        let column = self.get_column(key)?;
        let definition = column.definition();
        let params = HeaderValueParams {
            definition,
            context: self.options.context.as_ref(),
        };

        let computed = match (&definition.header_value_getter, &self.expressions) {
            (Some(HeaderValueGetter::Function(getter)), _) => Some(getter(&params)),
            (Some(HeaderValueGetter::Expression(expr)), Some(evaluator)) => {
                Some(evaluator.evaluate(expr, &params))
            }
            (Some(HeaderValueGetter::Expression(expr)), None) => {
                log::warn!("{}: no expression evaluator for header {}", key, expr);
                None
            }
            (None, _) => None,
        };

        computed
            .or_else(|| definition.header_name.clone())
            .or_else(|| definition.field.clone())
            .or_else(|| Some(column.id().to_string()))
    }

    // ========================================================================
    // MUTATORS
    // ========================================================================

    fn known_column(&self, op: &str, key: &str) -> ColumnResult<ColumnId> {
        if self.store.is_in_all_columns(key) {
            Ok(ColumnId::from(key))
        } else {
            Err(rejected(op, ColumnError::UnknownColumn(key.into())))
        }
    }

    /// Resizes one column, clamped to its bounds. `finished` is false while
    /// the user is still dragging; such an update is silent unless the width
    /// actually changed.
    pub fn set_column_width(&mut self, key: &str, width: u32, finished: bool) -> ColumnResult<()> {
        let id = if self.is_group_column(key) {
            ColumnId::from(key)
        } else {
            self.known_column("set_column_width", key)?
        };
        let changed = self
            .store
            .column_mut(id.as_str())
            .is_some_and(|column| column.set_actual_width(width));
        if !changed && !finished {
            return Ok(());
        }
        if changed {
            self.refresh();
        }
        self.sink.publish(ColumnEvent::ColumnResized { column: id, finished });
        Ok(())
    }

    pub fn set_column_visible(&mut self, key: &str, visible: bool) -> ColumnResult<()> {
        let id = self.known_column("set_column_visible", key)?;
        if let Some(column) = self.store.column_mut(id.as_str()) {
            column.visible = visible;
        }
        self.refresh();
        self.sink.publish(ColumnEvent::ColumnVisible { column: id });
        Ok(())
    }

    /// Shows or hides several columns with a single pipeline run. Unknown
    /// keys are warned about and skipped. Returns the columns whose visibility
    /// actually changed; nothing is derived or published when that is empty.
    pub fn hide_columns(&mut self, keys: &[&str], hide: bool) -> Vec<ColumnId> {
        let mut changed = Vec::new();
        for key in keys {
            let Ok(id) = self.known_column("hide_columns", key) else {
                continue;
            };
            if let Some(column) = self.store.column_mut(id.as_str()) {
                if column.visible == hide {
                    column.visible = !hide;
                    changed.push(id);
                }
            }
        }
        if changed.is_empty() {
            return changed;
        }

        self.refresh();
        for id in &changed {
            self.sink.publish(ColumnEvent::ColumnVisible { column: id.clone() });
        }
        changed
    }

    pub fn set_pinned_column_count(&mut self, count: i64) -> ColumnResult<()> {
        let count = usize::try_from(count)
            .map_err(|_| rejected("set_pinned_column_count", ColumnError::NegativePinnedCount(count)))?;
        self.store.pinned_column_count = count;
        self.refresh();
        self.sink.publish(ColumnEvent::PinnedCountChanged { count });
        Ok(())
    }

    /// Moves a column within the canonical order, by index into all columns.
    pub fn move_column(&mut self, from_index: usize, to_index: usize) -> ColumnResult<()> {
        move_within(&mut self.store.all_columns, from_index, to_index)
            .map_err(|e| rejected("move_column", e))?;
        self.refresh();
        self.sink.publish(ColumnEvent::ColumnMoved { from_index, to_index });
        Ok(())
    }

    pub fn add_pivot_column(&mut self, key: &str) -> ColumnResult<()> {
        let id = self.known_column("add_pivot_column", key)?;
        if self.store.is_pivot(key) {
            return Err(rejected("add_pivot_column", ColumnError::AlreadyPivot(id)));
        }
        self.store.pivot_columns.push(id);
        self.refresh();
        self.sink.publish(ColumnEvent::PivotChanged);
        Ok(())
    }

    /// Removes a pivot column. Placeholder pivots created from unknown group
    /// keys can be removed too.
    pub fn remove_pivot_column(&mut self, key: &str) -> ColumnResult<()> {
        if !self.store.is_pivot(key) {
            let err = if self.store.column(key).is_some() {
                ColumnError::NotPivot(key.into())
            } else {
                ColumnError::UnknownColumn(key.into())
            };
            return Err(rejected("remove_pivot_column", err));
        }
        self.store.pivot_columns.retain(|id| id.as_str() != key);
        self.refresh();
        self.sink.publish(ColumnEvent::PivotChanged);
        Ok(())
    }

    /// Reorders the breakdown, by index into the pivot columns.
    pub fn move_pivot_column(&mut self, from_index: usize, to_index: usize) -> ColumnResult<()> {
        move_within(&mut self.store.pivot_columns, from_index, to_index)
            .map_err(|e| rejected("move_pivot_column", e))?;
        self.refresh();
        self.sink.publish(ColumnEvent::PivotChanged);
        Ok(())
    }

    /// Makes a column a value column. One without an aggregation gets `Sum`.
    pub fn add_value_column(&mut self, key: &str) -> ColumnResult<()> {
        let id = self.known_column("add_value_column", key)?;
        if self.store.is_value(key) {
            return Err(rejected("add_value_column", ColumnError::AlreadyValue(id)));
        }
        if let Some(column) = self.store.column_mut(key) {
            column.agg_func.get_or_insert(AggFunc::Sum);
        }
        self.store.value_columns.push(id);
        self.refresh();
        self.sink.publish(ColumnEvent::ValueChanged);
        Ok(())
    }

    pub fn remove_value_column(&mut self, key: &str) -> ColumnResult<()> {
        let id = self.known_column("remove_value_column", key)?;
        if !self.store.is_value(key) {
            return Err(rejected("remove_value_column", ColumnError::NotValue(id)));
        }
        if let Some(column) = self.store.column_mut(key) {
            column.agg_func = None;
        }
        self.store.value_columns.retain(|v| v != &id);
        self.refresh();
        self.sink.publish(ColumnEvent::ValueChanged);
        Ok(())
    }

    pub fn set_column_agg_func(&mut self, key: &str, agg_func: AggFunc) -> ColumnResult<()> {
        let id = self.known_column("set_column_agg_func", key)?;
        if let Some(column) = self.store.column_mut(id.as_str()) {
            column.agg_func = Some(agg_func);
        }
        self.refresh();
        self.sink.publish(ColumnEvent::ValueChanged);
        Ok(())
    }

    /// Expands or collapses a named header group on one side of the pin
    /// boundary.
    pub fn column_group_opened(&mut self, key: &GroupKey, expanded: bool) -> ColumnResult<()> {
        if self.views.find_group(key).is_none() {
            let name = key.name.clone().unwrap_or_default();
            return Err(rejected("column_group_opened", ColumnError::UnknownGroup(name)));
        }
        self.store.group_state.insert(key.clone(), expanded);
        self.refresh();
        self.sink.publish(ColumnEvent::GroupOpened { group: key.clone() });
        Ok(())
    }

    /// Rescales the flexible displayed columns to fill `width` exactly.
    /// Returns the columns that took part.
    pub fn size_columns_to_fit(&mut self, width: i64) -> Vec<ColumnId> {
        let displayed = self.views.displayed_columns.clone();
        let resized = sizing::size_columns_to_fit(&mut self.store.columns, &displayed, width);
        if resized.is_empty() {
            return resized;
        }
        self.refresh();
        for id in &resized {
            self.sink.publish(ColumnEvent::ColumnResized {
                column: id.clone(),
                finished: true,
            });
        }
        resized
    }

    // ========================================================================
    // STATE
    // ========================================================================

    pub fn get_state(&self) -> Vec<ColumnState> {
        capture_state(&self.store)
    }

    /// Restores a snapshot. Never fails as a whole; records that could not be
    /// applied are listed in the report.
    pub fn set_state(&mut self, records: &[ColumnState]) -> StateRestoreReport {
        let report = apply_state(&mut self.store, records);
        self.refresh();
        self.sink.publish(ColumnEvent::EverythingChanged);
        report
    }
}

fn normalize_definitions(options: &mut GridOptions) {
    migrate_deprecated(&mut options.column_defs);
    if let Some(def) = options.group_column_def.as_mut() {
        migrate_deprecated(std::slice::from_mut(def));
    }
}

fn move_within(ids: &mut Vec<ColumnId>, from_index: usize, to_index: usize) -> ColumnResult<()> {
    let len = ids.len();
    for index in [from_index, to_index] {
        if index >= len {
            return Err(ColumnError::IndexOutOfRange { index, len });
        }
    }
    let id = ids.remove(from_index);
    ids.insert(to_index, id);
    Ok(())
}
