//! Storage trait definitions for sitetox
//!
//! `Worksheet` is the single storage abstraction: a row-oriented grid of text
//! cells addressed by 1-based (row, column) positions, with row 1 holding the
//! header. Both the bid table and the leaderboard are worksheets.
//!
//! The trait is async and backend-agnostic. An in-memory fake is provided for
//! testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A single cell write, 1-based coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

impl CellUpdate {
    pub fn new(row: usize, column: usize, value: impl Into<String>) -> Self {
        Self {
            row,
            column,
            value: value.into(),
        }
    }

    /// A1-style address of this cell (e.g. `C5`).
    pub fn a1(&self) -> StoreResult<String> {
        if self.row == 0 || self.column == 0 {
            return Err(StoreError::InvalidCell {
                row: self.row,
                column: self.column,
            });
        }
        Ok(format!("{}{}", column_letters(self.column), self.row))
    }
}

/// Convert a 1-based column index into spreadsheet letters (1 → A, 27 → AA).
pub fn column_letters(column: usize) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Row-oriented worksheet.
///
/// Guarantees:
/// - `read_all()` returns every populated row starting at row 1 (the header);
///   rows may be shorter than the header when trailing cells are empty.
/// - `update_cells()` writes each listed cell; other cells are untouched.
/// - `clear()` empties every cell; `write_rows()` then fills rows starting at
///   `first_row`, column A.
/// - Writes are last-write-wins; there is no locking.
#[async_trait]
pub trait Worksheet: Send + Sync {
    /// Worksheet title, used in ranges and log lines.
    fn title(&self) -> &str;

    /// Read the whole grid, header first.
    async fn read_all(&self) -> StoreResult<Vec<Vec<String>>>;

    /// Read a single row (1-based). Missing rows come back empty.
    async fn row_values(&self, row: usize) -> StoreResult<Vec<String>>;

    /// Write individual cells.
    async fn update_cells(&self, cells: &[CellUpdate]) -> StoreResult<()>;

    /// Remove every value from the worksheet.
    async fn clear(&self) -> StoreResult<()>;

    /// Write a block of rows starting at `first_row`, column A.
    async fn write_rows(&self, first_row: usize, rows: &[Vec<String>]) -> StoreResult<()>;
}
