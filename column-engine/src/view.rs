//! FILENAME: column-engine/src/view.rs
//! Column Views - What the renderers consume.
//!
//! The pipeline in this module recomputes every derived view from root state,
//! always in the same order:
//! 1. Visible columns (plus the synthetic grouping column when pivoting)
//! 2. Pin flags for the leading visible columns
//! 3. Header group forest, split along the pin boundary
//! 4. Group expand state, displayed columns and widths
//! 5. Displayed columns
//!
//! Each stage only reads what earlier stages of the same run produced.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::column::{Column, ColumnId};
use crate::definition::ColumnDefinition;
use crate::group::{ColumnGroup, GroupKey, GroupUpdateContext};
use crate::options::GridOptions;
use crate::pinning::split_for_pinning;
use crate::store::ColumnStore;
use crate::tree::pad_to_depth;

/// Derived views over the root state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Views {
    /// Columns not hidden by the user or the pivot rule, in canonical order.
    pub visible_columns: Vec<ColumnId>,
    /// Visible columns not hidden by a collapsed header group.
    pub displayed_columns: Vec<ColumnId>,
    /// Pin-split header forest. `None` when header grouping is off or the
    /// definitions declare no groups.
    pub column_groups: Option<Vec<ColumnGroup>>,
}

impl Views {
    /// Finds a group anywhere in the forest.
    pub fn find_group(&self, key: &GroupKey) -> Option<&ColumnGroup> {
        self.column_groups
            .as_ref()?
            .iter()
            .find_map(|group| group.find(key))
    }
}

/// Recomputes every view from root state. Also rewrites the derived per-column
/// fields (`pinned`, `display_index`) and recreates the synthetic grouping
/// column, so nothing from a previous run survives.
pub fn derive_views(store: &mut ColumnStore, options: &GridOptions) -> Views {
    let visible_columns = update_visible_columns(store, options);
    update_pinned_columns(store, &visible_columns);

    let visible_set: FxHashSet<ColumnId> = visible_columns.iter().cloned().collect();
    let mut column_groups = build_pinned_groups(store, options, &visible_set);

    if let Some(groups) = column_groups.as_mut() {
        let ctx = GroupUpdateContext {
            columns: &store.columns,
            visible: &visible_set,
            expanded: &store.group_state,
        };
        for group in groups.iter_mut() {
            group.update(&ctx);
        }
    }

    let displayed_columns = match &column_groups {
        None => visible_columns.clone(),
        Some(groups) => {
            let mut displayed = Vec::with_capacity(visible_columns.len());
            for group in groups {
                group.add_to_displayed_columns(&mut displayed);
            }
            displayed
        }
    };

    log::debug!(
        "derived views: {} columns, {} visible, {} displayed, {} pinned",
        store.all_columns.len(),
        visible_columns.len(),
        displayed_columns.len(),
        store.pinned_column_count.min(visible_columns.len()),
    );

    Views {
        visible_columns,
        displayed_columns,
        column_groups,
    }
}

fn needs_group_column(store: &ColumnStore, options: &GridOptions) -> bool {
    !store.pivot_columns.is_empty() && options.wants_auto_group_column()
}

fn group_column_definition(options: &GridOptions) -> ColumnDefinition {
    match &options.group_column_def {
        Some(def) => def.clone(),
        None => ColumnDefinition {
            header_name: Some(options.locale_text("group", "Group")),
            ..Default::default()
        },
    }
}

/// Stage 1.
fn update_visible_columns(store: &mut ColumnStore, options: &GridOptions) -> Vec<ColumnId> {
    let group_def = needs_group_column(store, options).then(|| group_column_definition(options));
    let group_column = store.replace_group_column(group_def, options);

    for column in store.columns.values_mut() {
        column.display_index = None;
    }

    let mut visible = Vec::with_capacity(store.all_columns.len() + 1);
    if let Some(id) = group_column {
        visible.push(id);
    }

    let hide_pivots = options.is_group_hide_pivot_columns();
    for id in &store.all_columns {
        let hidden_by_pivot = hide_pivots && store.pivot_columns.contains(id);
        let shown = store.columns.get(id).is_some_and(|c| c.visible);
        if shown && !hidden_by_pivot {
            visible.push(id.clone());
        }
    }

    for (index, id) in visible.iter().enumerate() {
        if let Some(column) = store.columns.get_mut(id) {
            column.display_index = Some(index);
        }
    }
    visible
}

/// Stage 2.
fn update_pinned_columns(store: &mut ColumnStore, visible: &[ColumnId]) {
    for column in store.columns.values_mut() {
        column.pinned = false;
    }
    for id in visible.iter().take(store.pinned_column_count) {
        if let Some(column) = store.columns.get_mut(id) {
            column.pinned = true;
        }
    }
}

/// Stage 3.
fn build_pinned_groups(
    store: &ColumnStore,
    options: &GridOptions,
    visible: &FxHashSet<ColumnId>,
) -> Option<Vec<ColumnGroup>> {
    // A flat forest has no header rows to render.
    if !options.is_group_headers() || store.all_columns_in_groups.is_empty() {
        return None;
    }

    let mut groups = Vec::new();
    if let Some(id) = &store.group_column {
        let depth = store.all_columns_in_groups.iter().map(|g| g.depth()).max().unwrap_or(1);
        let mut group = ColumnGroup::new(store.pinned_column_count > 0, None);
        group.add_column(id.clone());
        groups.push(pad_to_depth(group, depth - 1));
    }

    for template in &store.all_columns_in_groups {
        groups.extend(split_for_pinning(template, &store.columns, visible));
    }
    Some(groups)
}

/// Resolves display-order columns for a list of ids, skipping unknown ones.
pub fn resolve<'a>(store: &'a ColumnStore, ids: &'a [ColumnId]) -> impl Iterator<Item = &'a Column> + 'a {
    ids.iter().filter_map(move |id| store.columns.get(id))
}
