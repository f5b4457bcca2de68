//! FILENAME: column-engine/src/state.rs
//! PURPOSE: Flat, serializable snapshot of per-column user state.
//! CONTEXT: The snapshot carries what a user can change at runtime (order,
//! visibility, width, aggregation, pivot order) and nothing structural.
//! Restoring validates every record before touching the store.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::column::ColumnId;
use crate::definition::AggFunc;
use crate::store::ColumnStore;

/// State of one column. Records are kept in canonical column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub col_id: ColumnId,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub hide: bool,
    #[serde(default)]
    pub agg_func: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    /// Position among the pivot columns. Missing or negative means not a pivot.
    #[serde(default, deserialize_with = "lenient_index")]
    pub pivot_index: Option<i64>,
}

/// Host-written records are loosely typed: `null`, `0` and `""` read as false,
/// any other number or string as true.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    })
}

/// Accepts integers, whole floats and numeric strings. Anything else reads as
/// "not a pivot".
fn lenient_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// What a restore could not apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRestoreReport {
    /// Record ids that matched no column, or matched one a previous record
    /// already claimed.
    pub unmatched: Vec<ColumnId>,
    /// Columns whose recorded width was out of bounds and was ignored.
    pub rejected_widths: Vec<ColumnId>,
}

impl StateRestoreReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty() && self.rejected_widths.is_empty()
    }
}

/// Captures one record per column, in canonical order.
pub fn capture_state(store: &ColumnStore) -> Vec<ColumnState> {
    store
        .all_columns
        .iter()
        .filter_map(|id| store.column(id.as_str()))
        .map(|column| {
            let pivot_index = store
                .pivot_columns
                .iter()
                .position(|p| p == column.id())
                .map(|i| i as i64);
            ColumnState {
                col_id: column.id().clone(),
                hide: !column.is_visible(),
                agg_func: column.agg_func().map(|f| f.as_str().to_string()),
                width: Some(column.actual_width()),
                pivot_index,
            }
        })
        .collect()
}

/// Replaces order, visibility, widths, aggregation and pivot order from
/// `records`. Columns without a record are appended hidden, with their
/// aggregation cleared. Views are not derived here.
pub fn apply_state(store: &mut ColumnStore, records: &[ColumnState]) -> StateRestoreReport {
    let mut report = StateRestoreReport::default();

    // Validation pass: pick the records that will be applied.
    let mut seen: FxHashSet<ColumnId> = FxHashSet::default();
    let mut matched: Vec<&ColumnState> = Vec::with_capacity(records.len());
    for record in records {
        let known = store.is_in_all_columns(record.col_id.as_str());
        if !known || !seen.insert(record.col_id.clone()) {
            log::warn!("set_state: no column for state record {}", record.col_id);
            report.unmatched.push(record.col_id.clone());
            continue;
        }
        matched.push(record);
    }

    let mut all_columns = Vec::with_capacity(store.all_columns.len());
    let mut value_columns = Vec::new();
    let mut pivots: Vec<(i64, ColumnId)> = Vec::new();

    for record in matched {
        let Some(column) = store.columns.get_mut(record.col_id.as_str()) else {
            continue;
        };
        column.visible = !record.hide;

        if let Some(width) = record.width {
            if column.is_width_in_bounds(width) {
                column.set_actual_width(width);
            } else {
                log::warn!(
                    "set_state: width {} of {} is outside [{}, {:?}], keeping {}",
                    width,
                    record.col_id,
                    column.min_width(),
                    column.max_width(),
                    column.actual_width()
                );
                report.rejected_widths.push(record.col_id.clone());
            }
        }

        column.agg_func = record.agg_func.as_deref().and_then(AggFunc::builtin);
        if column.agg_func.is_some() {
            value_columns.push(record.col_id.clone());
        } else if let Some(name) = &record.agg_func {
            log::warn!("set_state: {} is not a built-in aggregation, cleared on {}", name, record.col_id);
        }

        if let Some(index) = record.pivot_index.filter(|i| *i >= 0) {
            pivots.push((index, record.col_id.clone()));
        }
        all_columns.push(record.col_id.clone());
    }

    for id in &store.all_columns {
        if seen.contains(id) {
            continue;
        }
        if let Some(column) = store.columns.get_mut(id) {
            column.visible = false;
            column.agg_func = None;
        }
        all_columns.push(id.clone());
    }

    pivots.sort_by_key(|(index, _)| *index);

    store.all_columns = all_columns;
    store.value_columns = value_columns;
    store.pivot_columns = pivots.into_iter().map(|(_, id)| id).collect();
    report
}
