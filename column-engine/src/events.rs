//! FILENAME: column-engine/src/events.rs
//! PURPOSE: Notifications published by the column model.
//! CONTEXT: Publishing is synchronous and fire-and-forget. The model never
//! looks at what a sink does with an event.

use serde::Serialize;

use crate::column::ColumnId;
use crate::group::GroupKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ColumnEvent {
    /// A column width changed. `finished` is false while a drag is in progress.
    ColumnResized { column: ColumnId, finished: bool },
    ColumnMoved { from_index: usize, to_index: usize },
    ColumnVisible { column: ColumnId },
    PinnedCountChanged { count: usize },
    PivotChanged,
    ValueChanged,
    GroupOpened { group: GroupKey },
    /// Columns were rebuilt or restored wholesale.
    EverythingChanged,
}

impl ColumnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnEvent::ColumnResized { .. } => "columnResized",
            ColumnEvent::ColumnMoved { .. } => "columnMoved",
            ColumnEvent::ColumnVisible { .. } => "columnVisible",
            ColumnEvent::PinnedCountChanged { .. } => "columnPinnedCountChanged",
            ColumnEvent::PivotChanged => "columnPivotChanged",
            ColumnEvent::ValueChanged => "columnValueChanged",
            ColumnEvent::GroupOpened { .. } => "columnGroupOpened",
            ColumnEvent::EverythingChanged => "columnEverythingChanged",
        }
    }
}

/// Receives model notifications.
pub trait EventSink {
    fn publish(&mut self, event: ColumnEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: ColumnEvent) {}
}

/// Keeps every event in order. Handy for hosts that batch notifications.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<ColumnEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the recorded events.
    pub fn take(&mut self) -> Vec<ColumnEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn publish(&mut self, event: ColumnEvent) {
        self.events.push(event);
    }
}
