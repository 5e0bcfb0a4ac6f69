//! Typed access to the bid worksheet.
//!
//! Reads go through the header row so column order in the sheet is free to
//! change. Each row write re-reads the header, resolves the five result
//! columns, issues one `update_cells` call, then waits [`WRITE_COOLDOWN`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::schema::{columns, BidRecord, BidUpdate, HeaderIndex, RowId};
use crate::storage_traits::{StoreResult, Worksheet};

/// Mandatory pause after every row write; the backend throttles writers.
pub const WRITE_COOLDOWN: Duration = Duration::from_millis(500);

/// Typed view over the bid worksheet
#[derive(Clone)]
pub struct BidTable {
    sheet: Arc<dyn Worksheet>,
}

impl BidTable {
    pub fn new(sheet: Arc<dyn Worksheet>) -> Self {
        Self { sheet }
    }

    pub fn worksheet(&self) -> &Arc<dyn Worksheet> {
        &self.sheet
    }

    /// Header plus every non-blank data row.
    pub async fn load(&self) -> StoreResult<(HeaderIndex, Vec<BidRecord>)> {
        let grid = self.sheet.read_all().await?;
        let mut rows = grid.into_iter();
        let header = HeaderIndex::from_row(&rows.next().unwrap_or_default());

        let records = rows
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(idx, cells)| BidRecord::from_row(RowId(idx + 2), &header, &cells))
            .collect();
        Ok((header, records))
    }

    /// Rows whose feedback cell is still empty.
    ///
    /// Fails when the feedback or case-site column is missing, since neither
    /// the pending predicate nor grouping can be evaluated without them.
    pub async fn pending(&self) -> StoreResult<Vec<BidRecord>> {
        let (header, records) = self.load().await?;
        header.require(&[columns::FEEDBACK, columns::CASE_SITE])?;

        let pending: Vec<BidRecord> = records.into_iter().filter(BidRecord::is_pending).collect();
        debug!(worksheet = %self.sheet.title(), pending = pending.len(), "Loaded pending bids");
        Ok(pending)
    }

    /// Write the result cells of one bid.
    ///
    /// A missing header aborts only this write and reports the headers seen.
    pub async fn apply(&self, row: RowId, update: &BidUpdate) -> StoreResult<()> {
        let header = HeaderIndex::from_row(&self.sheet.row_values(1).await?);
        let cells = update.to_cells(row, &header)?;

        let result = self.sheet.update_cells(&cells).await;
        tokio::time::sleep(WRITE_COOLDOWN).await;

        match &result {
            Ok(()) => debug!(
                row = %row,
                status = %update.status,
                quality = %update.quality,
                winner = update.is_winner,
                points = update.points,
                "Updated row"
            ),
            Err(e) => warn!(row = %row, error = %e, "Row update failed"),
        }
        result
    }
}
