//! FILENAME: column-engine/src/sizing.rs
//! PURPOSE: Fit-to-width: rescale flexible columns to exactly fill a width.
//! CONTEXT: Columns are scaled proportionally. A column that would leave its
//! min/max bounds is clamped and treated as fixed from then on, which changes
//! the space left for the others, so the pass repeats until nothing moves.
//!
//! Every pass reads the current partition and produces a new one; nothing is
//! removed from a list while it is being walked.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::column::{Column, ColumnId};

fn total_width(columns: &FxHashMap<ColumnId, Column>, ids: &[ColumnId]) -> i64 {
    ids.iter()
        .filter_map(|id| columns.get(id))
        .map(|c| i64::from(c.actual_width()))
        .sum()
}

/// Resizes the flexible columns among `displayed` so the displayed total
/// equals `target_width`. Returns the columns that were flexible going in
/// (whether or not their width ended up changing).
pub fn size_columns_to_fit(
    columns: &mut FxHashMap<ColumnId, Column>,
    displayed: &[ColumnId],
    target_width: i64,
) -> Vec<ColumnId> {
    if target_width <= 0 || displayed.is_empty() {
        return Vec::new();
    }
    // Widths are u32; a larger target could never be filled.
    let target_width = target_width.min(i64::from(u32::MAX));

    let (mut fixed, mut flexible): (Vec<ColumnId>, Vec<ColumnId>) = displayed
        .iter()
        .filter(|id| columns.contains_key(*id))
        .cloned()
        .partition(|id| columns[id].suppress_size_to_fit());
    let resized = flexible.clone();

    let mut passes = 0;
    while !flexible.is_empty() {
        passes += 1;
        let available = target_width - total_width(columns, &fixed);

        if available <= 0 {
            // No room at all, everything flexible goes to its minimum.
            for id in &flexible {
                if let Some(column) = columns.get_mut(id) {
                    column.set_minimum();
                }
            }
            break;
        }

        let scale = available as f64 / total_width(columns, &flexible) as f64;
        let mut remaining = available;
        let mut clamped: FxHashSet<ColumnId> = FxHashSet::default();

        // Backwards, so the first column takes whatever rounding left over.
        for (index, id) in flexible.iter().enumerate().rev() {
            let Some(column) = columns.get_mut(id) else {
                continue;
            };
            let scaled = (f64::from(column.actual_width()) * scale).round() as i64;
            let new_width = if index == 0 { remaining } else { scaled };

            if scaled < i64::from(column.min_width()) || new_width < i64::from(column.min_width()) {
                column.set_minimum();
                clamped.insert(id.clone());
            } else {
                let width = u32::try_from(new_width).unwrap_or(u32::MAX);
                if column.is_greater_than_max(width) {
                    column.set_actual_width(width);
                    clamped.insert(id.clone());
                } else {
                    column.set_actual_width(width);
                    remaining -= new_width;
                }
            }
        }

        if clamped.is_empty() {
            break;
        }
        let (now_fixed, still_flexible): (Vec<ColumnId>, Vec<ColumnId>) =
            flexible.into_iter().partition(|id| clamped.contains(id));
        fixed.extend(now_fixed);
        flexible = still_flexible;
    }

    log::debug!(
        "size_columns_to_fit({}): {} flexible columns settled after {} passes",
        target_width,
        resized.len(),
        passes
    );
    resized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ColumnDefinition;
    use crate::options::GridOptions;

    fn setup(defs: Vec<ColumnDefinition>, min: u32) -> (FxHashMap<ColumnId, Column>, Vec<ColumnId>) {
        let options = GridOptions {
            min_col_width: min,
            ..Default::default()
        };
        let mut map = FxHashMap::default();
        let mut order = Vec::new();
        for def in defs {
            let id = ColumnId::new(def.field.clone().unwrap_or_default());
            order.push(id.clone());
            map.insert(id.clone(), Column::new(id, def, &options));
        }
        (map, order)
    }

    fn widths(columns: &FxHashMap<ColumnId, Column>, order: &[ColumnId]) -> Vec<u32> {
        order.iter().map(|id| columns[id].actual_width()).collect()
    }

    #[test]
    fn test_even_scale_down() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(100),
                ColumnDefinition::leaf("b").with_width(100),
                ColumnDefinition::leaf("c").with_width(100),
            ],
            10,
        );
        let resized = size_columns_to_fit(&mut columns, &order, 210);
        assert_eq!(widths(&columns, &order), vec![70, 70, 70]);
        assert_eq!(resized.len(), 3);
    }

    #[test]
    fn test_rounding_remainder_goes_to_first_column() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(100),
                ColumnDefinition::leaf("b").with_width(100),
                ColumnDefinition::leaf("c").with_width(100),
            ],
            10,
        );
        size_columns_to_fit(&mut columns, &order, 200);
        let result = widths(&columns, &order);
        assert_eq!(result.iter().sum::<u32>(), 200);
        assert_eq!(result, vec![66, 67, 67]);
    }

    #[test]
    fn test_fixed_columns_are_untouched() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(100).suppress_size_to_fit(),
                ColumnDefinition::leaf("b").with_width(100),
                ColumnDefinition::leaf("c").with_width(300),
            ],
            10,
        );
        let resized = size_columns_to_fit(&mut columns, &order, 500);
        assert_eq!(widths(&columns, &order), vec![100, 100, 300]);
        assert_eq!(resized, vec![ColumnId::from("b"), ColumnId::from("c")]);

        size_columns_to_fit(&mut columns, &order, 900);
        assert_eq!(widths(&columns, &order), vec![100, 200, 600]);
    }

    #[test]
    fn test_max_clamp_redistributes() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(100).with_max_width(120),
                ColumnDefinition::leaf("b").with_width(100),
            ],
            10,
        );
        size_columns_to_fit(&mut columns, &order, 400);
        assert_eq!(widths(&columns, &order), vec![120, 280]);
    }

    #[test]
    fn test_min_clamp_redistributes() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(100).with_min_width(90),
                ColumnDefinition::leaf("b").with_width(100),
                ColumnDefinition::leaf("c").with_width(100),
            ],
            10,
        );
        size_columns_to_fit(&mut columns, &order, 150);
        let result = widths(&columns, &order);
        assert_eq!(result[0], 90);
        assert_eq!(result.iter().sum::<u32>(), 150);
    }

    #[test]
    fn test_no_room_forces_minimum() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(300).suppress_size_to_fit(),
                ColumnDefinition::leaf("b").with_width(100),
            ],
            25,
        );
        let resized = size_columns_to_fit(&mut columns, &order, 200);
        assert_eq!(widths(&columns, &order), vec![300, 25]);
        assert_eq!(resized, vec![ColumnId::from("b")]);
    }

    #[test]
    fn test_noop_for_non_positive_target() {
        let (mut columns, order) = setup(vec![ColumnDefinition::leaf("a").with_width(100)], 10);
        assert!(size_columns_to_fit(&mut columns, &order, 0).is_empty());
        assert!(size_columns_to_fit(&mut columns, &order, -5).is_empty());
        assert!(size_columns_to_fit(&mut columns, &[], 500).is_empty());
        assert_eq!(widths(&columns, &order), vec![100]);
    }

    #[test]
    fn test_target_beyond_u32_saturates() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(100),
                ColumnDefinition::leaf("b").with_width(100),
            ],
            10,
        );
        let resized = size_columns_to_fit(&mut columns, &order, 5_000_000_000);
        assert_eq!(resized.len(), 2);
        let total: u64 = widths(&columns, &order).iter().map(|w| u64::from(*w)).sum();
        assert_eq!(total, u64::from(u32::MAX));
    }

    #[test]
    fn test_widths_stay_in_bounds_across_targets() {
        let (mut columns, order) = setup(
            vec![
                ColumnDefinition::leaf("a").with_width(80).with_min_width(40).with_max_width(150),
                ColumnDefinition::leaf("b").with_width(120).with_min_width(60),
                ColumnDefinition::leaf("c").with_width(50).with_max_width(90),
                ColumnDefinition::leaf("d").with_width(200),
            ],
            20,
        );
        for target in [1, 90, 173, 250, 401, 999, 5000] {
            size_columns_to_fit(&mut columns, &order, target);
            for id in &order {
                let column = &columns[id];
                assert!(column.actual_width() >= column.min_width(), "{} at {}", id, target);
                if let Some(max) = column.max_width() {
                    assert!(column.actual_width() <= max, "{} at {}", id, target);
                }
            }
        }
    }
}
