//! End-to-end grading run.
//!
//! Pending bids are grouped by case and each group is handled on its own:
//! evaluate every bid and persist it straight away, then pick at most one
//! winner from the Highly competitive and Eligible pool. Failures stay inside
//! the bid, row write or group they occur in. The leaderboard is rebuilt once,
//! after the last group.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sitetox_reasoning::ReasoningService;
use sitetox_state::{
    BidRecord, BidTable, BidUpdate, EvaluationStatus, QualityTier, RowId, StoreError, Worksheet,
};
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::catalog::CaseCatalog;
use crate::domain::{GroupDisposition, GroupOutcome, Result, RunReport};
use crate::evaluator::BidEvaluator;
use crate::leaderboard::LeaderboardAggregator;
use crate::obs::{
    emit_bid_evaluated, emit_group_skipped, emit_leaderboard_failed, emit_leaderboard_rebuilt,
    emit_row_write_failed, emit_run_finished, emit_run_started, emit_winner_selected, RunSpan,
};
use crate::protocol::ReasoningProtocol;
use crate::selector::WinnerSelector;

/// Feedback for rows whose case has no catalog entry.
pub const SKIPPED_FEEDBACK: &str = "Case details missing";

/// Feedback overwriting the winning row's evaluation text.
pub const WINNER_FEEDBACK: &str = "Selected as Best Bid";

/// Partition bids by case identifier, keeping row order inside each group.
pub fn group_by_case(bids: Vec<BidRecord>) -> BTreeMap<String, Vec<BidRecord>> {
    let mut groups: BTreeMap<String, Vec<BidRecord>> = BTreeMap::new();
    for bid in bids {
        groups.entry(bid.case_site.clone()).or_default().push(bid);
    }
    groups
}

pub struct EvaluationPipeline {
    bids: BidTable,
    leaderboard: LeaderboardAggregator,
    evaluator: BidEvaluator,
    selector: WinnerSelector,
    catalog: Arc<CaseCatalog>,
}

impl EvaluationPipeline {
    pub fn new(
        catalog: CaseCatalog,
        reasoning: Arc<dyn ReasoningService>,
        bids: Arc<dyn Worksheet>,
        leaderboard: Arc<dyn Worksheet>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let protocol = ReasoningProtocol::new(reasoning);
        let bids = BidTable::new(bids);
        Self {
            leaderboard: LeaderboardAggregator::new(bids.clone(), leaderboard),
            evaluator: BidEvaluator::new(protocol.clone(), catalog.clone()),
            selector: WinnerSelector::new(protocol, catalog.clone()),
            bids,
            catalog,
        }
    }

    pub fn catalog(&self) -> &CaseCatalog {
        &self.catalog
    }

    /// Process every pending bid, then rebuild the leaderboard.
    ///
    /// Only a failure to read the bid worksheet is returned as an error; a
    /// missing feedback or case column reads as "nothing pending".
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = RunSpan::new(&run_id);
        self.run_inner(run_id).instrument(span.span()).await
    }

    async fn run_inner(&self, run_id: String) -> Result<RunReport> {
        let started_at = Utc::now();

        let pending = match self.bids.pending().await {
            Ok(pending) => pending,
            Err(e @ StoreError::MissingColumn { .. }) => {
                error!(error = %e, "Bid worksheet is missing a required column");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        let pending_count = pending.len();
        let groups = group_by_case(pending);
        emit_run_started(&run_id, pending_count, groups.len());
        if pending_count == 0 {
            info!("No pending bids to process");
        }

        let mut outcomes = Vec::with_capacity(groups.len());
        for (case_id, bids) in &groups {
            outcomes.push(self.process_group(case_id, bids).await);
        }

        let (leaderboard, leaderboard_error) = match self.leaderboard.rebuild().await {
            Ok(Some(entries)) => {
                emit_leaderboard_rebuilt(entries.len());
                (Some(entries), None)
            }
            Ok(None) => (None, None),
            Err(e) => {
                emit_leaderboard_failed(&e);
                (None, Some(e.to_string()))
            }
        };

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            pending: pending_count,
            groups: outcomes,
            leaderboard,
            leaderboard_error,
        };
        emit_run_finished(
            &report.run_id,
            report.duration_ms(),
            report.groups.len(),
            report.winners(),
            report.failed_writes(),
        );
        Ok(report)
    }

    async fn process_group(&self, case_id: &str, bids: &[BidRecord]) -> GroupOutcome {
        let rows: Vec<RowId> = bids.iter().map(|b| b.row).collect();
        let mut failed_writes = Vec::new();

        if !self.catalog.contains(case_id) {
            emit_group_skipped(case_id, bids.len());
            let update = BidUpdate {
                status: EvaluationStatus::Skipped,
                feedback: SKIPPED_FEEDBACK.to_string(),
                quality: QualityTier::Error,
                is_winner: false,
                points: 0,
            };
            for bid in bids {
                self.write(bid.row, &update, &mut failed_writes).await;
            }
            return GroupOutcome {
                case_id: case_id.to_string(),
                rows,
                disposition: GroupDisposition::Skipped,
                failed_writes,
            };
        }

        info!(case_id = %case_id, bids = bids.len(), "Processing case");
        let mut evaluations = Vec::with_capacity(bids.len());
        let mut highly_competitive = Vec::new();
        let mut eligible = Vec::new();

        for bid in bids {
            let result = self
                .evaluator
                .evaluate(&bid.team_name, &bid.specialty, &bid.reasoning, case_id)
                .await;
            emit_bid_evaluated(case_id, bid.row, &bid.team_name, result.tier);

            match result.tier {
                QualityTier::HighlyCompetitive => highly_competitive.push(bid.clone()),
                QualityTier::Eligible => eligible.push(bid.clone()),
                QualityTier::Unfunded | QualityTier::Error => {}
            }
            evaluations.push((bid.row, result.tier));

            let update = BidUpdate {
                status: EvaluationStatus::Evaluated,
                feedback: result.feedback,
                quality: result.tier,
                is_winner: false,
                points: 0,
            };
            self.write(bid.row, &update, &mut failed_writes).await;
        }

        let candidates: Vec<BidRecord> = highly_competitive.into_iter().chain(eligible).collect();
        let winner = self.selector.select(&candidates, case_id).await.winner();
        emit_winner_selected(case_id, winner, candidates.len());

        if let Some(row) = winner {
            let evaluated_tier = evaluations
                .iter()
                .find(|(evaluated, tier)| *evaluated == row && tier.is_qualifying())
                .map(|(_, tier)| *tier);
            let update = match evaluated_tier {
                Some(tier) => BidUpdate {
                    status: EvaluationStatus::Evaluated,
                    feedback: WINNER_FEEDBACK.to_string(),
                    quality: tier,
                    is_winner: true,
                    points: 1,
                },
                None => {
                    error!(case_id = %case_id, row = %row, "Winning row is not an evaluated candidate");
                    BidUpdate {
                        status: EvaluationStatus::Evaluated,
                        feedback: WINNER_FEEDBACK.to_string(),
                        quality: QualityTier::Error,
                        is_winner: true,
                        points: 0,
                    }
                }
            };
            self.write(row, &update, &mut failed_writes).await;
        }

        GroupOutcome {
            case_id: case_id.to_string(),
            rows,
            disposition: GroupDisposition::Judged {
                evaluations,
                candidates: candidates.len(),
                winner,
            },
            failed_writes,
        }
    }

    async fn write(&self, row: RowId, update: &BidUpdate, failed: &mut Vec<RowId>) {
        if let Err(e) = self.bids.apply(row, update).await {
            emit_row_write_failed(row, &e);
            if !failed.contains(&row) {
                failed.push(row);
            }
        }
    }
}
