//! FILENAME: column-engine/src/error.rs
//! PURPOSE: Rejection reasons for column model operations.
//! CONTEXT: None of these are fatal. A rejected operation is logged as a
//! warning, leaves the model untouched and hands the reason back to the caller.

use thiserror::Error;

use crate::column::ColumnId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnError {
    #[error("column not found: {0}")]
    UnknownColumn(ColumnId),

    #[error("column group not found: {0}")]
    UnknownGroup(String),

    #[error("pinned column count must be zero or greater, got {0}")]
    NegativePinnedCount(i64),

    #[error("index {index} out of range for {len} columns")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("column is already a pivot column: {0}")]
    AlreadyPivot(ColumnId),

    #[error("column is already a value column: {0}")]
    AlreadyValue(ColumnId),

    #[error("column is not a pivot column: {0}")]
    NotPivot(ColumnId),

    #[error("column is not a value column: {0}")]
    NotValue(ColumnId),
}

pub type ColumnResult<T> = Result<T, ColumnError>;

/// Logs a rejected operation and passes the error through.
pub(crate) fn rejected(op: &str, err: ColumnError) -> ColumnError {
    log::warn!("{}: {}", op, err);
    err
}
