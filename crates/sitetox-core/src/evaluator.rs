//! Per-bid evaluation.

use std::sync::Arc;

use sitetox_state::QualityTier;
use tracing::warn;

use crate::catalog::CaseCatalog;
use crate::domain::EvaluationResult;
use crate::parser::{parse_evaluation, quality_markers};
use crate::prompts::evaluation_prompt;
use crate::protocol::{Consultation, ReasoningProtocol};

/// Feedback written when the case has no catalog entry.
pub const CASE_NOT_FOUND_FEEDBACK: &str = "Case details not found.";

struct EvaluationRequest<'a> {
    case_description: &'a str,
    specialty: &'a str,
    reasoning: &'a str,
}

impl Consultation for EvaluationRequest<'_> {
    type Verdict = EvaluationResult;

    fn stage(&self) -> &'static str {
        "evaluate"
    }

    fn prompt(&self) -> String {
        evaluation_prompt(
            self.case_description,
            self.specialty,
            self.reasoning,
            &quality_markers(),
        )
    }

    fn interpret(&self, reply: &str) -> EvaluationResult {
        parse_evaluation(reply)
    }
}

/// Rates one bid against its case description.
#[derive(Clone)]
pub struct BidEvaluator {
    protocol: ReasoningProtocol,
    catalog: Arc<CaseCatalog>,
}

impl BidEvaluator {
    pub fn new(protocol: ReasoningProtocol, catalog: Arc<CaseCatalog>) -> Self {
        Self { protocol, catalog }
    }

    /// Never fails: service errors and unknown cases come back as
    /// [`QualityTier::Error`] with the reason as feedback.
    pub async fn evaluate(
        &self,
        team: &str,
        specialty: &str,
        reasoning: &str,
        case_id: &str,
    ) -> EvaluationResult {
        let case_description = match self.catalog.describe(case_id) {
            Ok(description) => description,
            Err(e) => {
                warn!(team = %team, case_id = %case_id, error = %e, "Cannot evaluate bid");
                return EvaluationResult::error(CASE_NOT_FOUND_FEEDBACK);
            }
        };

        let request = EvaluationRequest {
            case_description,
            specialty,
            reasoning,
        };
        match self.protocol.consult(&request).await {
            Ok(result) => {
                if result.tier == QualityTier::Error {
                    warn!(team = %team, case_id = %case_id, "Evaluation reply had no tier marker");
                }
                result
            }
            Err(e) => EvaluationResult::error(e.to_string()),
        }
    }
}
