//! FILENAME: column-engine/src/pinning.rs
//! PURPOSE: Splits header groups along the pin boundary.
//! CONTEXT: Pinned columns render in a separate container from the scrolling
//! body, so a header group straddling the boundary must become two groups,
//! one per side, both carrying the same name. Groups whose columns are all
//! hidden are dropped.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::column::{Column, ColumnId};
use crate::group::ColumnGroup;

/// Zero, one or two groups. When two, the pinned one comes first.
pub type PinSplit = SmallVec<[ColumnGroup; 2]>;

/// Splits `group` so every resulting group is wholly pinned or wholly
/// unpinned, recursing into subgroups when the group holds no columns itself.
pub fn split_for_pinning(
    group: &ColumnGroup,
    columns: &FxHashMap<ColumnId, Column>,
    visible: &FxHashSet<ColumnId>,
) -> PinSplit {
    if !group.is_visible_in(visible) {
        return PinSplit::new();
    }

    let is_pinned = |id: &ColumnId| columns.get(id).is_some_and(|c| c.is_pinned());
    let (pinned_cols, unpinned_cols): (Vec<&ColumnId>, Vec<&ColumnId>) =
        group.columns().partition(|id| is_pinned(*id));

    if !pinned_cols.is_empty() || !unpinned_cols.is_empty() {
        let mut result = PinSplit::new();
        for (pinned, bucket) in [(true, pinned_cols), (false, unpinned_cols)] {
            if bucket.is_empty() {
                continue;
            }
            let mut side = ColumnGroup::new(pinned, group.name().map(String::from));
            for id in bucket {
                side.add_column(id.clone());
            }
            result.push(side);
        }
        return result;
    }

    let mut pinned_subs = Vec::new();
    let mut unpinned_subs = Vec::new();
    for sub_group in group.sub_groups() {
        for part in split_for_pinning(sub_group, columns, visible) {
            if part.is_pinned() {
                pinned_subs.push(part);
            } else {
                unpinned_subs.push(part);
            }
        }
    }

    let mut result = PinSplit::new();
    for (pinned, bucket) in [(true, pinned_subs), (false, unpinned_subs)] {
        if bucket.is_empty() {
            continue;
        }
        let mut side = ColumnGroup::new(pinned, group.name().map(String::from));
        for sub in bucket {
            side.add_sub_group(sub);
        }
        result.push(side);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ColumnDefinition;
    use crate::group::GroupChild;
    use crate::options::GridOptions;

    fn columns_with_pins(pins: &[(&str, bool)]) -> FxHashMap<ColumnId, Column> {
        let options = GridOptions::default();
        pins.iter()
            .map(|(field, pinned)| {
                let mut column = Column::new((*field).into(), ColumnDefinition::leaf(*field), &options);
                column.pinned = *pinned;
                (column.id().clone(), column)
            })
            .collect()
    }

    fn all_visible(columns: &FxHashMap<ColumnId, Column>) -> FxHashSet<ColumnId> {
        columns.keys().cloned().collect()
    }

    fn group_of(name: &str, ids: &[&str]) -> ColumnGroup {
        let mut group = ColumnGroup::new(false, Some(name.to_string()));
        for id in ids {
            group.add_column((*id).into());
        }
        group
    }

    fn assert_homogeneous(group: &ColumnGroup, columns: &FxHashMap<ColumnId, Column>) {
        for leaf in group.leaf_columns() {
            assert_eq!(columns[leaf].is_pinned(), group.is_pinned(), "leaf {}", leaf);
        }
        for child in group.children() {
            if let GroupChild::Group(sub) = child {
                assert_eq!(sub.is_pinned(), group.is_pinned());
                assert_homogeneous(sub, columns);
            }
        }
    }

    #[test]
    fn test_mixed_group_splits_in_two() {
        let columns = columns_with_pins(&[("a", true), ("b", false), ("c", true)]);
        let group = group_of("Sales", &["a", "b", "c"]);
        let split = split_for_pinning(&group, &columns, &all_visible(&columns));

        assert_eq!(split.len(), 2);
        assert!(split[0].is_pinned());
        assert_eq!(split[0].columns().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
        assert!(!split[1].is_pinned());
        assert_eq!(split[1].columns().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["b"]);
        assert!(split.iter().all(|g| g.name() == Some("Sales")));
    }

    #[test]
    fn test_homogeneous_group_stays_whole() {
        let columns = columns_with_pins(&[("a", false), ("b", false)]);
        let group = group_of("G", &["a", "b"]);
        let split = split_for_pinning(&group, &columns, &all_visible(&columns));
        assert_eq!(split.len(), 1);
        assert!(!split[0].is_pinned());
        assert_eq!(split[0].columns().count(), 2);

        let columns = columns_with_pins(&[("a", true), ("b", true)]);
        let split = split_for_pinning(&group, &columns, &all_visible(&columns));
        assert_eq!(split.len(), 1);
        assert!(split[0].is_pinned());
    }

    #[test]
    fn test_invisible_group_is_dropped() {
        let columns = columns_with_pins(&[("a", false)]);
        let group = group_of("G", &["a"]);
        let split = split_for_pinning(&group, &columns, &FxHashSet::default());
        assert!(split.is_empty());
    }

    #[test]
    fn test_nested_split_wraps_subgroups() {
        let columns = columns_with_pins(&[("a", true), ("b", false), ("c", false), ("d", false)]);
        let mut outer = ColumnGroup::new(false, Some("Outer".to_string()));
        outer.add_sub_group(group_of("Left", &["a", "b"]));
        outer.add_sub_group(group_of("Right", &["c", "d"]));

        let split = split_for_pinning(&outer, &columns, &all_visible(&columns));
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].name(), Some("Outer"));
        assert_eq!(split[1].name(), Some("Outer"));

        let pinned_subs: Vec<_> = split[0].sub_groups().map(|g| g.name()).collect();
        assert_eq!(pinned_subs, vec![Some("Left")]);
        let unpinned_subs: Vec<_> = split[1].sub_groups().map(|g| g.name()).collect();
        assert_eq!(unpinned_subs, vec![Some("Left"), Some("Right")]);

        for group in &split {
            assert_homogeneous(group, &columns);
        }
    }

    #[test]
    fn test_hidden_subgroup_pruned_during_split() {
        let columns = columns_with_pins(&[("a", false), ("b", false)]);
        let mut outer = ColumnGroup::new(false, Some("Outer".to_string()));
        outer.add_sub_group(group_of("Shown", &["a"]));
        outer.add_sub_group(group_of("Hidden", &["b"]));

        let visible: FxHashSet<ColumnId> = [ColumnId::from("a")].into_iter().collect();
        let split = split_for_pinning(&outer, &columns, &visible);
        assert_eq!(split.len(), 1);
        let names: Vec<_> = split[0].sub_groups().map(|g| g.name()).collect();
        assert_eq!(names, vec![Some("Shown")]);
    }
}
