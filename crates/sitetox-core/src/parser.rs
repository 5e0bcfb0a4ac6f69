//! Verdict extraction from free-text replies.
//!
//! Only the end of a reply is authoritative. A tier name mentioned inside the
//! rationale never counts; the reply has to finish on a recognised marker.
//! Markdown emphasis wrapped around the marker (`**`, `_`, backticks) is
//! ignored.

use sitetox_state::QualityTier;

use crate::domain::EvaluationResult;

/// Prefix written into feedback when an evaluation reply has no marker.
pub const PARSE_ERROR_NOTICE: &str = "Parsing Error: Unexpected LLM response format.";

/// Label preceding the tier in an evaluation reply.
pub const QUALITY_LABEL: &str = "Bid Quality";

/// Label preceding the ordinal in a comparison reply.
pub const WINNER_LABEL: &str = "Winning Proposal";

/// Why a comparison reply did not yield a usable ordinal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no 'Winning Proposal:' line at end of response")]
    MissingMarker,

    #[error("winning proposal '{0}' is not a number")]
    NotANumber(String),

    #[error("winning proposal {ordinal} is outside 1..={candidates}")]
    OutOfRange { ordinal: i64, candidates: usize },
}

fn is_emphasis(c: char) -> bool {
    matches!(c, '*' | '_' | '`')
}

/// A fixed set of terminal markers, each standing for one verdict.
#[derive(Debug, Clone)]
pub struct MarkerSet<T> {
    markers: Vec<(String, T)>,
}

impl<T: Copy> MarkerSet<T> {
    pub fn new(markers: impl IntoIterator<Item = (String, T)>) -> Self {
        Self {
            markers: markers.into_iter().collect(),
        }
    }

    /// Marker texts in declaration order.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|(m, _)| m.as_str())
    }

    /// Verdict of the marker `text` ends with, plus the narrative before it.
    pub fn match_suffix<'a>(&self, text: &'a str) -> Option<(T, &'a str)> {
        let body = text.trim().trim_end_matches(is_emphasis).trim_end();
        self.markers.iter().find_map(|(marker, verdict)| {
            body.strip_suffix(marker.as_str()).map(|rest| {
                let narrative = rest.trim_end().trim_end_matches(is_emphasis).trim();
                (*verdict, narrative)
            })
        })
    }
}

/// `Bid Quality: <tier>` markers for the three rubric tiers.
pub fn quality_markers() -> MarkerSet<QualityTier> {
    MarkerSet::new(
        QualityTier::RUBRIC
            .iter()
            .map(|tier| (format!("{QUALITY_LABEL}: {}", tier.as_str()), *tier)),
    )
}

/// Split an evaluation reply into tier and feedback.
///
/// A reply without a recognised marker yields [`QualityTier::Error`] with the
/// whole reply kept as feedback behind [`PARSE_ERROR_NOTICE`].
pub fn parse_evaluation(text: &str) -> EvaluationResult {
    match quality_markers().match_suffix(text) {
        Some((tier, narrative)) => EvaluationResult::new(tier, narrative),
        None => EvaluationResult::error(format!("{PARSE_ERROR_NOTICE}\n{}", text.trim())),
    }
}

/// Read the 1-based ordinal from the last non-empty line of a comparison
/// reply. Accepts `Winning Proposal: 2`, `Winning Proposal: [2]` and
/// emphasised variants.
pub fn parse_winning_ordinal(text: &str, candidates: usize) -> Result<usize, ParseError> {
    let last = text.trim().lines().last().unwrap_or_default();
    let line = last.trim().trim_matches(is_emphasis).trim();

    let after_label = line
        .find(WINNER_LABEL)
        .map(|pos| &line[pos + WINNER_LABEL.len()..])
        .ok_or(ParseError::MissingMarker)?;
    let value = after_label
        .trim_start()
        .trim_start_matches(is_emphasis)
        .strip_prefix(':')
        .ok_or(ParseError::MissingMarker)?;
    let value = value
        .trim()
        .trim_matches(|c: char| is_emphasis(c) || matches!(c, '[' | ']' | '.'))
        .trim();

    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::NotANumber(value.to_string()));
    }
    // Well-formed but wider than i64: saturate so it reports as out of range.
    let ordinal: i64 = value.parse().unwrap_or(if value.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    });
    if ordinal < 1 || ordinal as u64 > candidates as u64 {
        return Err(ParseError::OutOfRange {
            ordinal,
            candidates,
        });
    }
    Ok(ordinal as usize)
}
