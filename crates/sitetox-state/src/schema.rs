//! Schema definitions for the sitetox worksheets
//!
//! Tables:
//! - bids: one row per submitted proposal, columns in [`columns`]
//! - leaderboard: `Team Name`, `Total Points`, fully rewritten per run
//!
//! Column positions are never assumed; they are resolved through a
//! [`HeaderIndex`] built from row 1.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage_traits::{CellUpdate, StoreResult};

/// Header names used by the bid and leaderboard worksheets.
pub mod columns {
    pub const TEAM_NAME: &str = "Team Name";
    pub const SPECIALTY: &str = "Microbial Specialty";
    pub const REASONING: &str = "Reasoning for Bid";
    pub const CASE_SITE: &str = "Case Site Bidding On";
    pub const STATUS: &str = "Evaluation Status";
    pub const FEEDBACK: &str = "Gemini Feedback";
    pub const QUALITY: &str = "Bid Quality";
    pub const IS_WINNER: &str = "Is Winning Bid";
    pub const POINTS: &str = "Points Awarded";

    pub const TOTAL_POINTS: &str = "Total Points";
}

/// 1-based worksheet row position. Row 1 is the header, so bids start at 2.
///
/// Positional identity only holds for the duration of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub usize);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a bid is in the grading lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationStatus {
    Pending,
    Evaluated,
    Skipped,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Evaluated => "Evaluated",
            Self::Skipped => "Skipped",
        }
    }

    /// Anything other than a recognised terminal status reads as pending.
    pub fn parse_cell(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "evaluated" => Self::Evaluated,
            "skipped" => Self::Skipped,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality tier assigned by the per-bid evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    HighlyCompetitive,
    Eligible,
    Unfunded,
    /// Evaluation could not produce a verdict (service failure, bad reply,
    /// missing case details).
    Error,
}

impl QualityTier {
    /// Tiers the reasoning service is allowed to emit, in rubric order.
    pub const RUBRIC: [QualityTier; 3] = [
        QualityTier::HighlyCompetitive,
        QualityTier::Eligible,
        QualityTier::Unfunded,
    ];

    /// Label as written to the sheet and used in reply markers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighlyCompetitive => "Highly competitive",
            Self::Eligible => "Eligible",
            Self::Unfunded => "Unfunded",
            Self::Error => "Error",
        }
    }

    /// Only these tiers enter the winner comparison.
    pub fn is_qualifying(&self) -> bool {
        matches!(self, Self::HighlyCompetitive | Self::Eligible)
    }

    /// Parse a sheet cell. Blank or unknown text is an unset tier.
    pub fn parse_cell(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', " ");
        match normalized.as_str() {
            "highly competitive" => Some(Self::HighlyCompetitive),
            "eligible" => Some(Self::Eligible),
            "unfunded" => Some(Self::Unfunded),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column lookup built from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIndex {
    names: Vec<String>,
}

impl HeaderIndex {
    pub fn from_row(row: &[String]) -> Self {
        Self {
            names: row.iter().map(|name| name.trim().to_string()).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, column: &str) -> bool {
        self.names.iter().any(|name| name == column)
    }

    /// 1-based column position of `column`.
    pub fn position(&self, column: &str) -> StoreResult<usize> {
        self.names
            .iter()
            .position(|name| name == column)
            .map(|idx| idx + 1)
            .ok_or_else(|| StoreError::MissingColumn {
                column: column.to_string(),
                seen: self.names.clone(),
            })
    }

    /// Fail on the first of `required` that is absent.
    pub fn require(&self, required: &[&str]) -> StoreResult<()> {
        for column in required {
            self.position(column)?;
        }
        Ok(())
    }

    /// Value of `column` in `cells`, empty when the column or cell is absent.
    pub fn cell<'a>(&self, cells: &'a [String], column: &str) -> &'a str {
        self.names
            .iter()
            .position(|name| name == column)
            .and_then(|idx| cells.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Normalise a points cell: non-numeric or missing is zero, fractions truncate,
/// negatives clamp to zero.
pub fn coerce_points(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n.clamp(0, u32::MAX as i64) as u32;
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// One row of the bid worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub row: RowId,
    pub team_name: String,
    /// Declared specialty, kept verbatim; the reasoning service judges it.
    pub specialty: String,
    pub reasoning: String,
    pub case_site: String,
    pub status: EvaluationStatus,
    pub quality: Option<QualityTier>,
    pub feedback: String,
    pub is_winner: bool,
    pub points: u32,
}

impl BidRecord {
    /// Build a record from raw cells, looking every field up by header name.
    pub fn from_row(row: RowId, header: &HeaderIndex, cells: &[String]) -> Self {
        let text = |column: &str| header.cell(cells, column).trim().to_string();
        Self {
            row,
            team_name: header.cell(cells, columns::TEAM_NAME).to_string(),
            specialty: text(columns::SPECIALTY),
            reasoning: text(columns::REASONING),
            case_site: text(columns::CASE_SITE),
            status: EvaluationStatus::parse_cell(header.cell(cells, columns::STATUS)),
            quality: QualityTier::parse_cell(header.cell(cells, columns::QUALITY)),
            feedback: header.cell(cells, columns::FEEDBACK).to_string(),
            is_winner: header
                .cell(cells, columns::IS_WINNER)
                .trim()
                .eq_ignore_ascii_case("yes"),
            points: coerce_points(header.cell(cells, columns::POINTS)),
        }
    }

    /// A bid is pending while its feedback cell is empty or absent.
    pub fn is_pending(&self) -> bool {
        self.feedback.is_empty()
    }
}

/// The five result cells the pipeline writes for a bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidUpdate {
    pub status: EvaluationStatus,
    pub feedback: String,
    pub quality: QualityTier,
    pub is_winner: bool,
    pub points: u32,
}

impl BidUpdate {
    /// Resolve each result column against `header` and produce cell writes.
    pub fn to_cells(&self, row: RowId, header: &HeaderIndex) -> StoreResult<Vec<CellUpdate>> {
        let winner = if self.is_winner { "Yes" } else { "No" };
        Ok(vec![
            CellUpdate::new(row.0, header.position(columns::STATUS)?, self.status.as_str()),
            CellUpdate::new(row.0, header.position(columns::FEEDBACK)?, self.feedback.as_str()),
            CellUpdate::new(row.0, header.position(columns::QUALITY)?, self.quality.as_str()),
            CellUpdate::new(row.0, header.position(columns::IS_WINNER)?, winner),
            CellUpdate::new(row.0, header.position(columns::POINTS)?, self.points.to_string()),
        ])
    }
}
