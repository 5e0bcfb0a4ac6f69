//! Leaderboard rebuild.
//!
//! The leaderboard is a projection of every bid row, recomputed from scratch.
//! It is cleared and rewritten in full; there is no incremental update.

use std::collections::BTreeMap;
use std::sync::Arc;

use sitetox_state::{columns, BidRecord, BidTable, Worksheet};
use tracing::info;

use crate::domain::{LeaderboardEntry, Result};

/// Sum points per team, highest first. Equal totals keep ascending team-name
/// order. Names are compared exactly as stored, so a blank name is a team of
/// its own and `"Team A "` is not `"Team A"`.
pub fn rank(records: &[BidRecord]) -> Vec<LeaderboardEntry> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.team_name.as_str()).or_default() += u64::from(record.points);
    }

    let mut entries: Vec<LeaderboardEntry> = totals
        .into_iter()
        .map(|(team_name, points)| LeaderboardEntry {
            team_name: team_name.to_string(),
            points,
        })
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries
}

/// Header plus one row per entry, ready for `write_rows`.
pub fn render(entries: &[LeaderboardEntry]) -> Vec<Vec<String>> {
    std::iter::once(vec![
        columns::TEAM_NAME.to_string(),
        columns::TOTAL_POINTS.to_string(),
    ])
    .chain(
        entries
            .iter()
            .map(|e| vec![e.team_name.clone(), e.points.to_string()]),
    )
    .collect()
}

#[derive(Clone)]
pub struct LeaderboardAggregator {
    bids: BidTable,
    board: Arc<dyn Worksheet>,
}

impl LeaderboardAggregator {
    pub fn new(bids: BidTable, board: Arc<dyn Worksheet>) -> Self {
        Self { bids, board }
    }

    /// Recompute totals from every bid row and overwrite the leaderboard.
    ///
    /// Returns `Ok(None)` and leaves the leaderboard alone when the bid table
    /// has no data rows. A missing `Team Name` or `Points Awarded` header is
    /// an error, also without touching the leaderboard.
    pub async fn rebuild(&self) -> Result<Option<Vec<LeaderboardEntry>>> {
        let (header, records) = self.bids.load().await?;
        if records.is_empty() {
            info!(worksheet = %self.board.title(), "No bid data; leaderboard left unchanged");
            return Ok(None);
        }
        header.require(&[columns::TEAM_NAME, columns::POINTS])?;

        let entries = rank(&records);
        self.board.clear().await?;
        self.board.write_rows(1, &render(&entries)).await?;
        Ok(Some(entries))
    }
}
