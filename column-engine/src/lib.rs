//! FILENAME: column-engine/src/lib.rs
//! Column model and layout engine for the grid.
//!
//! This crate owns the columns of a grid: their header group tree, pivot and
//! aggregation roles, pin and visibility state, and pixel widths. Renderers
//! read the derived views; they never build their own.
//!
//! Layers:
//! - `definition` / `options`: Serializable input (what the columns ARE)
//! - `column` / `group`: Live nodes with model-maintained state
//! - `tree` / `pinning`: Header forest building and pin splitting
//! - `view`: Derived views, recomputed after every mutation
//! - `sizing`: Fit-to-width distribution under min/max bounds
//! - `state`: Flat snapshot for save and restore
//! - `model`: The engine tying it together

pub mod column;
pub mod definition;
pub mod error;
pub mod events;
pub mod group;
pub mod model;
pub mod options;
pub mod pinning;
pub mod sizing;
pub mod state;
pub mod store;
pub mod tree;
pub mod view;


pub use column::{Column, ColumnId};
pub use definition::{
    AggFunc, ColumnDefinition, ExpressionEvaluator, HeaderGroupShow, HeaderValueGetter, HeaderValueParams,
};
pub use error::{ColumnError, ColumnResult};
pub use events::{ColumnEvent, EventSink, NullSink, RecordingSink};
pub use group::{ColumnGroup, GroupChild, GroupKey};
pub use model::ColumnModel;
pub use options::{GridOptions, DEFAULT_COL_WIDTH, MIN_COL_WIDTH};
pub use state::{ColumnState, StateRestoreReport};
pub use view::Views;
