//! FILENAME: column-engine/src/group.rs
//! PURPOSE: Header group tree nodes.
//! CONTEXT: A ColumnGroup is a value node. The view pipeline builds fresh
//! groups on every run, so nothing outside the pipeline holds on to one.
//! Expand state lives in the model, keyed by `GroupKey`, and is read back in
//! during `update`.
//!
//! A key is only a name and a pin side. Groups that share a name on the same
//! side therefore open and close together, and `find` returns the first one.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::column::{Column, ColumnId};
use crate::definition::HeaderGroupShow;

/// Stable identity of a group across pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupKey {
    pub name: Option<String>,
    pub pinned: bool,
}

impl GroupKey {
    pub fn new(name: impl Into<String>, pinned: bool) -> Self {
        GroupKey {
            name: Some(name.into()),
            pinned,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum GroupChild {
    Column(ColumnId),
    Group(ColumnGroup),
}

/// What a group needs to know about the rest of the model to refresh itself.
pub struct GroupUpdateContext<'a> {
    pub columns: &'a FxHashMap<ColumnId, Column>,
    pub visible: &'a FxHashSet<ColumnId>,
    pub expanded: &'a FxHashMap<GroupKey, bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnGroup {
    pinned: bool,
    name: Option<String>,
    children: Vec<GroupChild>,
    expanded: bool,
    expandable: bool,
    total_width: u32,
    displayed_columns: Vec<ColumnId>,
}

impl ColumnGroup {
    pub fn new(pinned: bool, name: Option<String>) -> Self {
        ColumnGroup {
            pinned,
            name,
            children: Vec::new(),
            expanded: true,
            expandable: false,
            total_width: 0,
            displayed_columns: Vec::new(),
        }
    }

    pub fn add_column(&mut self, id: ColumnId) {
        self.children.push(GroupChild::Column(id));
    }

    pub fn add_sub_group(&mut self, group: ColumnGroup) {
        self.children.push(GroupChild::Group(group));
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn key(&self) -> GroupKey {
        GroupKey {
            name: self.name.clone(),
            pinned: self.pinned,
        }
    }

    pub fn children(&self) -> &[GroupChild] {
        &self.children
    }

    /// Columns held directly by this group, in order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnId> {
        self.children.iter().filter_map(|child| match child {
            GroupChild::Column(id) => Some(id),
            GroupChild::Group(_) => None,
        })
    }

    /// Direct subgroups, in order.
    pub fn sub_groups(&self) -> impl Iterator<Item = &ColumnGroup> {
        self.children.iter().filter_map(|child| match child {
            GroupChild::Group(group) => Some(group),
            GroupChild::Column(_) => None,
        })
    }

    /// Every column under this group, depth first.
    pub fn leaf_columns(&self) -> Vec<&ColumnId> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ColumnId>) {
        for child in &self.children {
            match child {
                GroupChild::Column(id) => out.push(id),
                GroupChild::Group(group) => group.collect_leaves(out),
            }
        }
    }

    /// Number of edges from this group down to its deepest leaf.
    pub fn depth(&self) -> usize {
        1 + self.sub_groups().map(|g| g.depth()).max().unwrap_or(0)
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// Sum of the widths of the displayed columns, as of the last update.
    pub fn total_width(&self) -> u32 {
        self.total_width
    }

    /// Columns of this group that are rendered, as of the last update.
    pub fn displayed_columns(&self) -> &[ColumnId] {
        &self.displayed_columns
    }

    pub fn add_to_displayed_columns(&self, out: &mut Vec<ColumnId>) {
        out.extend(self.displayed_columns.iter().cloned());
    }

    /// True if any column under this group is in `visible`.
    pub fn is_visible_in(&self, visible: &FxHashSet<ColumnId>) -> bool {
        self.columns().any(|id| visible.contains(id))
            || self.sub_groups().any(|g| g.is_visible_in(visible))
    }

    /// Finds this group or a descendant by key.
    pub fn find(&self, key: &GroupKey) -> Option<&ColumnGroup> {
        if self.name.is_some() && &self.key() == key {
            return Some(self);
        }
        self.sub_groups().find_map(|g| g.find(key))
    }

    /// Resolves expand state, then recomputes displayed columns and total width
    /// bottom-up. Unnamed (padding) groups are always expanded and pass the
    /// state of their nearest named ancestor through to their children.
    pub fn update(&mut self, ctx: &GroupUpdateContext) {
        self.update_within(ctx, true);
    }

    fn update_within(&mut self, ctx: &GroupUpdateContext, inherited: bool) {
        let open = match self.name {
            Some(_) => ctx.expanded.get(&self.key()).copied().unwrap_or(true),
            None => inherited,
        };
        self.expanded = self.name.is_none() || open;
        self.expandable = self.name.is_some() && !self.children.is_empty();

        let mut displayed = Vec::new();
        for child in self.children.iter_mut() {
            match child {
                GroupChild::Column(id) => {
                    if !ctx.visible.contains(id) {
                        continue;
                    }
                    let show = ctx.columns.get(id).and_then(|c| c.header_group_show());
                    let shown = match show {
                        None | Some(HeaderGroupShow::Open) => open,
                        Some(HeaderGroupShow::Closed) => !open,
                    };
                    if shown {
                        displayed.push(id.clone());
                    }
                }
                GroupChild::Group(group) => {
                    group.update_within(ctx, open);
                    if open || group.name.is_none() {
                        group.add_to_displayed_columns(&mut displayed);
                    }
                }
            }
        }
        self.total_width = displayed
            .iter()
            .filter_map(|id| ctx.columns.get(id))
            .fold(0u32, |total, c| total.saturating_add(c.actual_width()));
        self.displayed_columns = displayed;
    }
}
