//! Comparative winner selection within one case group.

use std::sync::Arc;

use sitetox_state::{BidRecord, RowId};
use tracing::{info, warn};

use crate::catalog::CaseCatalog;
use crate::parser::{parse_winning_ordinal, ParseError};
use crate::prompts::selection_prompt;
use crate::protocol::{Consultation, ReasoningProtocol};

/// What selection decided, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Nothing qualified; no call was made.
    NoCandidates,
    /// The case has no catalog entry; no call was made.
    UnknownCase,
    /// A single candidate wins without a comparison call.
    Sole(RowId),
    /// The service picked `ordinal` out of `candidates`.
    Chosen {
        row: RowId,
        ordinal: usize,
        candidates: usize,
    },
    /// The comparison call failed or its reply could not be mapped.
    Unresolved(String),
}

impl Selection {
    pub fn winner(&self) -> Option<RowId> {
        match self {
            Selection::Sole(row) | Selection::Chosen { row, .. } => Some(*row),
            _ => None,
        }
    }
}

struct SelectionRequest<'a> {
    case_description: &'a str,
    candidates: &'a [BidRecord],
}

impl Consultation for SelectionRequest<'_> {
    type Verdict = Result<usize, ParseError>;

    fn stage(&self) -> &'static str {
        "select"
    }

    fn prompt(&self) -> String {
        selection_prompt(self.case_description, self.candidates)
    }

    fn interpret(&self, reply: &str) -> Self::Verdict {
        parse_winning_ordinal(reply, self.candidates.len())
    }
}

#[derive(Clone)]
pub struct WinnerSelector {
    protocol: ReasoningProtocol,
    catalog: Arc<CaseCatalog>,
}

impl WinnerSelector {
    pub fn new(protocol: ReasoningProtocol, catalog: Arc<CaseCatalog>) -> Self {
        Self { protocol, catalog }
    }

    /// Row id of the winning candidate, if any.
    pub async fn select_winner(&self, candidates: &[BidRecord], case_id: &str) -> Option<RowId> {
        self.select(candidates, case_id).await.winner()
    }

    /// Pick the strongest of `candidates`. Ordinals in the prompt follow slice
    /// order and are mapped back the same way.
    pub async fn select(&self, candidates: &[BidRecord], case_id: &str) -> Selection {
        let case_description = match self.catalog.describe(case_id) {
            Ok(description) => description,
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "Cannot compare bids");
                return Selection::UnknownCase;
            }
        };

        match candidates {
            [] => Selection::NoCandidates,
            [only] => Selection::Sole(only.row),
            _ => {
                let request = SelectionRequest {
                    case_description,
                    candidates,
                };
                match self.protocol.consult(&request).await {
                    Ok(Ok(ordinal)) => {
                        let row = candidates[ordinal - 1].row;
                        info!(case_id = %case_id, ordinal, row = %row, "Comparison picked a proposal");
                        Selection::Chosen {
                            row,
                            ordinal,
                            candidates: candidates.len(),
                        }
                    }
                    Ok(Err(e)) => {
                        warn!(case_id = %case_id, error = %e, "Comparison reply unusable");
                        Selection::Unresolved(e.to_string())
                    }
                    Err(e) => Selection::Unresolved(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitetox_reasoning::fakes::ScriptedReasoner;
    use sitetox_state::EvaluationStatus;

    fn bid(row: usize, team: &str) -> BidRecord {
        BidRecord {
            row: RowId(row),
            team_name: team.to_string(),
            specialty: "aerobic".to_string(),
            reasoning: format!("{team} reasoning"),
            case_site: "Site 5".to_string(),
            status: EvaluationStatus::Pending,
            quality: None,
            feedback: String::new(),
            is_winner: false,
            points: 0,
        }
    }

    fn selector(reasoner: Arc<ScriptedReasoner>) -> WinnerSelector {
        WinnerSelector::new(
            ReasoningProtocol::new(reasoner),
            Arc::new(CaseCatalog::builtin()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_and_single_make_no_call() {
        let reasoner = Arc::new(ScriptedReasoner::new());
        let selector = selector(reasoner.clone());

        assert_eq!(selector.select(&[], "Site 5").await, Selection::NoCandidates);
        assert_eq!(
            selector.select_winner(&[bid(4, "Team A")], "Site 5").await,
            Some(RowId(4))
        );
        assert_eq!(reasoner.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ordinal_maps_back_to_row() {
        let reasoner = Arc::new(ScriptedReasoner::new().then("B is clearer.\nWinning Proposal: 2"));
        let candidates = [bid(3, "Team A"), bid(8, "Team B"), bid(9, "Team C")];

        let selection = selector(reasoner.clone()).select(&candidates, "Site 5").await;
        assert_eq!(
            selection,
            Selection::Chosen {
                row: RowId(8),
                ordinal: 2,
                candidates: 3
            }
        );
        assert_eq!(reasoner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_and_failures_yield_none() {
        let candidates = [bid(3, "Team A"), bid(8, "Team B")];

        let reasoner = Arc::new(ScriptedReasoner::new().then("Winning Proposal: 5"));
        assert_eq!(selector(reasoner).select_winner(&candidates, "Site 5").await, None);

        let reasoner = Arc::new(ScriptedReasoner::new().then("I like both."));
        assert_eq!(selector(reasoner).select_winner(&candidates, "Site 5").await, None);

        let reasoner = Arc::new(ScriptedReasoner::new().then_fail("network down"));
        let selection = selector(reasoner).select(&candidates, "Site 5").await;
        assert!(matches!(selection, Selection::Unresolved(ref msg) if msg.contains("network down")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_case_returns_none_without_call() {
        let reasoner = Arc::new(ScriptedReasoner::new());
        let candidates = [bid(3, "Team A"), bid(8, "Team B")];

        assert_eq!(
            selector(reasoner.clone()).select(&candidates, "Site 9").await,
            Selection::UnknownCase
        );
        assert_eq!(reasoner.calls(), 0);
    }
}
