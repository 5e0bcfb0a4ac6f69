//! Structured observability hooks for the grading run lifecycle.
//!
//! This module provides:
//! - A run-scoped span via [`RunSpan`], used to instrument the run future
//! - Emission functions for lifecycle events: run start/finish, group skip,
//!   bid evaluation, winner selection, row write failure, leaderboard rebuild
//!
//! Events are emitted at `info!` level, failures at `warn!`. Filtering and
//! JSON output are configured through [`crate::init_tracing`].

use sitetox_state::{QualityTier, RowId};
use tracing::{info, warn, Span};

/// Span tagged with a run id; every event inside the run inherits it.
///
/// ```ignore
/// let span = RunSpan::new(&run_id);
/// pipeline_body().instrument(span.span()).await;
/// ```
pub struct RunSpan {
    span: Span,
}

impl RunSpan {
    pub fn new(run_id: &str) -> Self {
        Self {
            span: tracing::info_span!("sitetox.run", run_id = %run_id),
        }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

pub fn emit_run_started(run_id: &str, pending: usize, groups: usize) {
    info!(event = "run.started", run_id = %run_id, pending = pending, groups = groups);
}

pub fn emit_group_skipped(case_id: &str, rows: usize) {
    warn!(event = "group.skipped", case_id = %case_id, rows = rows, reason = "unknown case");
}

pub fn emit_bid_evaluated(case_id: &str, row: RowId, team: &str, tier: QualityTier) {
    info!(
        event = "bid.evaluated",
        case_id = %case_id,
        row = row.0,
        team = %team,
        tier = %tier,
    );
}

/// Emit event: group closed with or without a winner.
pub fn emit_winner_selected(case_id: &str, winner: Option<RowId>, candidates: usize) {
    match winner {
        Some(row) => info!(
            event = "winner.selected",
            case_id = %case_id,
            row = row.0,
            candidates = candidates,
        ),
        None => info!(event = "winner.none", case_id = %case_id, candidates = candidates),
    }
}

pub fn emit_row_write_failed(row: RowId, error: &dyn std::fmt::Display) {
    warn!(event = "row.write_failed", row = row.0, error = %error);
}

pub fn emit_leaderboard_rebuilt(teams: usize) {
    info!(event = "leaderboard.rebuilt", teams = teams);
}

pub fn emit_leaderboard_failed(error: &dyn std::fmt::Display) {
    warn!(event = "leaderboard.failed", error = %error);
}

/// Emit event: run finished with counts and duration.
pub fn emit_run_finished(
    run_id: &str,
    duration_ms: u64,
    groups: usize,
    winners: usize,
    failed_writes: usize,
) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        groups = groups,
        winners = winners,
        failed_writes = failed_writes,
    );
}
