//! Domain models for sitetox.
//!
//! - `EvaluationResult`: tier plus feedback produced for one bid
//! - `LeaderboardEntry`: one ranked team in the rebuilt leaderboard
//! - `RunReport`: what a pipeline run did, group by group

pub mod error;
pub mod report;

pub use error::{GraderError, Result};
pub use report::{GroupDisposition, GroupOutcome, RunReport};

use serde::{Deserialize, Serialize};
use sitetox_state::QualityTier;

/// Verdict for a single bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub tier: QualityTier,
    pub feedback: String,
}

impl EvaluationResult {
    pub fn new(tier: QualityTier, feedback: impl Into<String>) -> Self {
        Self {
            tier,
            feedback: feedback.into(),
        }
    }

    /// Sentinel verdict carrying a diagnostic as feedback.
    pub fn error(feedback: impl Into<String>) -> Self {
        Self::new(QualityTier::Error, feedback)
    }
}

/// Team total as written to the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub team_name: String,
    pub points: u64,
}
