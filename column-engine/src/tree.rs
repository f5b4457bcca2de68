//! FILENAME: column-engine/src/tree.rs
//! PURPOSE: Builds columns and the balanced header group forest from definitions.
//! CONTEXT: Header definitions may nest to different depths. Renderers want
//! one header row per level, so every branch shallower than the deepest one is
//! padded with unnamed groups until every leaf sits exactly `target_depth`
//! groups below the top of the forest.
//!
//! This is also the only place where the canonical column order is set: leaves
//! are appended to `all_columns` in the order they are encountered.

use crate::column::{Column, ColumnId, ColumnIdAllocator};
use crate::definition::{max_depth, ColumnDefinition};
use crate::group::{ColumnGroup, GroupChild};
use crate::options::GridOptions;

/// Output of a full rebuild.
#[derive(Debug)]
pub struct ColumnTree {
    /// Every leaf column, in definition order.
    pub columns: Vec<Column>,
    /// Balanced template forest. Empty when header grouping is off or the
    /// definitions contain no groups.
    pub groups: Vec<ColumnGroup>,
}

impl ColumnTree {
    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id().clone()).collect()
    }
}

/// Builds the columns and, when header grouping is on, the balanced forest.
pub fn build_column_tree(defs: &[ColumnDefinition], options: &GridOptions) -> ColumnTree {
    let mut builder = TreeBuilder {
        options,
        ids: ColumnIdAllocator::new(),
        columns: Vec::new(),
    };

    let mut groups = Vec::new();
    if options.is_group_headers() {
        let target_depth = max_depth(defs);
        for def in defs {
            // A top-level leaf only stays bare when the whole forest is flat.
            if let GroupChild::Group(group) = builder.process(def, target_depth) {
                groups.push(group);
            }
        }
    } else {
        for def in defs {
            builder.flatten(def);
        }
    }

    ColumnTree {
        columns: builder.columns,
        groups,
    }
}

struct TreeBuilder<'a> {
    options: &'a GridOptions,
    ids: ColumnIdAllocator,
    columns: Vec<Column>,
}

impl<'a> TreeBuilder<'a> {
    fn create_column(&mut self, def: &ColumnDefinition) -> ColumnId {
        let id = self.ids.allocate(def);
        self.columns.push(Column::new(id.clone(), def.clone(), self.options));
        id
    }

    /// Ungrouped mode: only leaves matter.
    fn flatten(&mut self, def: &ColumnDefinition) {
        if def.is_group() {
            for child in def.children() {
                self.flatten(child);
            }
        } else {
            self.create_column(def);
        }
    }

    fn process(&mut self, def: &ColumnDefinition, target_depth: usize) -> GroupChild {
        let depth = def.depth();

        if def.is_group() {
            let padding = target_depth.saturating_sub(depth);
            // Children sit one level lower, and padding above this node pushes
            // them down further.
            let child_target = target_depth.saturating_sub(1 + padding);

            let mut group = ColumnGroup::new(def.pinned, def.header_name.clone());
            for child in def.children() {
                match self.process(child, child_target) {
                    GroupChild::Column(id) => group.add_column(id),
                    GroupChild::Group(sub) => group.add_sub_group(sub),
                }
            }
            GroupChild::Group(pad_to_depth(group, padding))
        } else {
            let id = self.create_column(def);
            if depth < target_depth {
                let mut group = ColumnGroup::new(def.pinned, None);
                group.add_column(id);
                GroupChild::Group(pad_to_depth(group, target_depth - depth - 1))
            } else {
                GroupChild::Column(id)
            }
        }
    }
}

/// Wraps `group` in `levels` unnamed groups carrying the same pin flag.
pub(crate) fn pad_to_depth(group: ColumnGroup, levels: usize) -> ColumnGroup {
    let mut top = group;
    for _ in 0..levels {
        let mut parent = ColumnGroup::new(top.is_pinned(), None);
        parent.add_sub_group(top);
        top = parent;
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped_options() -> GridOptions {
        GridOptions {
            group_headers: true,
            ..Default::default()
        }
    }

    /// (column, number of groups above it) for every leaf.
    fn leaf_depths(groups: &[ColumnGroup]) -> Vec<(String, usize)> {
        fn walk(group: &ColumnGroup, level: usize, out: &mut Vec<(String, usize)>) {
            for child in group.children() {
                match child {
                    GroupChild::Column(id) => out.push((id.to_string(), level)),
                    GroupChild::Group(sub) => walk(sub, level + 1, out),
                }
            }
        }
        let mut out = Vec::new();
        for group in groups {
            walk(group, 1, &mut out);
        }
        out
    }

    #[test]
    fn test_flat_definitions_produce_no_groups() {
        let defs = vec![ColumnDefinition::leaf("a"), ColumnDefinition::leaf("b")];
        let tree = build_column_tree(&defs, &grouped_options());
        assert_eq!(tree.column_ids(), vec![ColumnId::from("a"), ColumnId::from("b")]);
        assert!(tree.groups.is_empty());
    }

    #[test]
    fn test_irregular_depth_is_balanced() {
        let defs = vec![
            ColumnDefinition::leaf("solo"),
            ColumnDefinition::group(
                "Deep",
                vec![
                    ColumnDefinition::leaf("x"),
                    ColumnDefinition::group(
                        "Mid",
                        vec![ColumnDefinition::group("Low", vec![ColumnDefinition::leaf("y")])],
                    ),
                ],
            ),
            ColumnDefinition::group("Shallow", vec![ColumnDefinition::leaf("z")]),
        ];
        let tree = build_column_tree(&defs, &grouped_options());

        assert_eq!(
            tree.column_ids(),
            vec![ColumnId::from("solo"), ColumnId::from("x"), ColumnId::from("y"), ColumnId::from("z")]
        );
        assert_eq!(tree.groups.len(), 3);

        let depths = leaf_depths(&tree.groups);
        assert_eq!(depths.len(), 4);
        assert!(depths.iter().all(|(_, level)| *level == 3), "{:?}", depths);
        assert!(tree.groups.iter().all(|g| g.depth() == 3));
    }

    #[test]
    fn test_padding_sits_above_named_group() {
        let defs = vec![
            ColumnDefinition::group("Top", vec![ColumnDefinition::group("Sub", vec![ColumnDefinition::leaf("a")])]),
            ColumnDefinition::group("Shallow", vec![ColumnDefinition::leaf("b")]),
        ];
        let tree = build_column_tree(&defs, &grouped_options());

        let shallow_top = &tree.groups[1];
        assert_eq!(shallow_top.name(), None);
        let named: Vec<_> = shallow_top.sub_groups().collect();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].name(), Some("Shallow"));
        assert_eq!(named[0].columns().count(), 1);
    }

    #[test]
    fn test_padding_inherits_pin_flag() {
        let defs = vec![
            ColumnDefinition::leaf("p").pinned(),
            ColumnDefinition::group("G", vec![ColumnDefinition::leaf("a")]),
        ];
        let tree = build_column_tree(&defs, &grouped_options());
        assert!(tree.groups[0].is_pinned());
        assert!(!tree.groups[1].is_pinned());
    }

    #[test]
    fn test_ungrouped_mode_flattens_leaves() {
        let defs = vec![
            ColumnDefinition::group("G", vec![ColumnDefinition::leaf("a"), ColumnDefinition::leaf("b")]),
            ColumnDefinition::leaf("c"),
        ];
        let tree = build_column_tree(&defs, &GridOptions::default());
        assert_eq!(
            tree.column_ids(),
            vec![ColumnId::from("a"), ColumnId::from("b"), ColumnId::from("c")]
        );
        assert!(tree.groups.is_empty());
    }

    #[test]
    fn test_empty_group_definition() {
        let defs = vec![ColumnDefinition::group("Empty", vec![]), ColumnDefinition::leaf("a")];
        let tree = build_column_tree(&defs, &grouped_options());
        assert_eq!(tree.groups.len(), 2);
        assert_eq!(tree.groups[0].children().len(), 0);
        assert_eq!(tree.column_ids(), vec![ColumnId::from("a")]);
    }
}
