//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryWorksheet`, a `Worksheet` backed by a `Vec<Vec<String>>`
//! that satisfies the trait contract without any external dependencies, plus
//! fault injection for row writes.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::storage_traits::*;

/// In-memory worksheet grid.
#[derive(Debug, Default)]
pub struct MemoryWorksheet {
    title: String,
    grid: Mutex<Vec<Vec<String>>>,
    failing_rows: Mutex<HashSet<usize>>,
    update_calls: Mutex<usize>,
}

impl MemoryWorksheet {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Seed the grid; the first row is the header.
    pub fn with_rows<R, C>(title: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let sheet = Self::new(title);
        *sheet.grid.lock().unwrap() = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        sheet
    }

    /// Make every `update_cells` call touching `row` fail.
    pub fn fail_updates_on_row(&self, row: usize) {
        self.failing_rows.lock().unwrap().insert(row);
    }

    /// Copy of the current grid.
    pub fn snapshot(&self) -> Vec<Vec<String>> {
        self.grid.lock().unwrap().clone()
    }

    /// Value at 1-based coordinates, empty when out of range.
    pub fn cell(&self, row: usize, column: usize) -> String {
        let grid = self.grid.lock().unwrap();
        row.checked_sub(1)
            .and_then(|r| grid.get(r))
            .and_then(|cells| column.checked_sub(1).and_then(|c| cells.get(c)))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `update_cells` calls received, including failed ones.
    pub fn update_calls(&self) -> usize {
        *self.update_calls.lock().unwrap()
    }

    fn set(grid: &mut Vec<Vec<String>>, row: usize, column: usize, value: &str) {
        if grid.len() < row {
            grid.resize(row, Vec::new());
        }
        let cells = &mut grid[row - 1];
        if cells.len() < column {
            cells.resize(column, String::new());
        }
        cells[column - 1] = value.to_string();
    }
}

#[async_trait]
impl Worksheet for MemoryWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    async fn read_all(&self) -> StoreResult<Vec<Vec<String>>> {
        Ok(self.snapshot())
    }

    async fn row_values(&self, row: usize) -> StoreResult<Vec<String>> {
        if row == 0 {
            return Err(StoreError::InvalidCell { row, column: 1 });
        }
        let grid = self.grid.lock().unwrap();
        Ok(grid.get(row - 1).cloned().unwrap_or_default())
    }

    async fn update_cells(&self, cells: &[CellUpdate]) -> StoreResult<()> {
        *self.update_calls.lock().unwrap() += 1;

        let failing = self.failing_rows.lock().unwrap();
        if let Some(cell) = cells.iter().find(|c| failing.contains(&c.row)) {
            return Err(StoreError::Injected(format!(
                "update of row {} rejected",
                cell.row
            )));
        }
        for cell in cells {
            cell.a1()?;
        }

        let mut grid = self.grid.lock().unwrap();
        for cell in cells {
            Self::set(&mut grid, cell.row, cell.column, &cell.value);
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.grid.lock().unwrap().clear();
        Ok(())
    }

    async fn write_rows(&self, first_row: usize, rows: &[Vec<String>]) -> StoreResult<()> {
        if first_row == 0 {
            return Err(StoreError::InvalidCell {
                row: first_row,
                column: 1,
            });
        }
        let mut grid = self.grid.lock().unwrap();
        for (offset, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                Self::set(&mut grid, first_row + offset, col + 1, value);
            }
        }
        Ok(())
    }
}
