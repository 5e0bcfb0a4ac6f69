//! Run report returned by [`crate::EvaluationPipeline::run`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitetox_state::{QualityTier, RowId};

use super::LeaderboardEntry;

/// How a case group ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupDisposition {
    /// Case identifier unknown; every row written as Skipped.
    Skipped,
    /// Every row evaluated; `winner` is set when selection produced one.
    Judged {
        evaluations: Vec<(RowId, QualityTier)>,
        candidates: usize,
        winner: Option<RowId>,
    },
}

/// Outcome of one case group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutcome {
    pub case_id: String,
    pub rows: Vec<RowId>,
    pub disposition: GroupDisposition,
    /// Rows whose result write failed.
    pub failed_writes: Vec<RowId>,
}

impl GroupOutcome {
    pub fn winner(&self) -> Option<RowId> {
        match &self.disposition {
            GroupDisposition::Judged { winner, .. } => *winner,
            GroupDisposition::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.disposition, GroupDisposition::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pending: usize,
    pub groups: Vec<GroupOutcome>,
    /// Ranked teams, or `None` when the leaderboard was left untouched.
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
    pub leaderboard_error: Option<String>,
}

impl RunReport {
    pub fn winners(&self) -> usize {
        self.groups.iter().filter(|g| g.winner().is_some()).count()
    }

    pub fn skipped_groups(&self) -> usize {
        self.groups.iter().filter(|g| g.is_skipped()).count()
    }

    pub fn failed_writes(&self) -> usize {
        self.groups.iter().map(|g| g.failed_writes.len()).sum()
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}
