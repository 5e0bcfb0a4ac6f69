//! sitetox core library
//!
//! Grades submitted remediation bids with a reasoning service, picks one
//! winner per case site, and keeps a team leaderboard, all against a shared
//! spreadsheet.
//!
//! ## Key Components
//!
//! - `CaseCatalog`: case identifier → description handed to the service
//! - `BidEvaluator` / `WinnerSelector`: the two reasoning stages, sharing
//!   `ReasoningProtocol` (one call, then a cooldown)
//! - `EvaluationPipeline`: per-case orchestration and the `RunReport`
//! - `LeaderboardAggregator`: full rebuild of team totals

pub mod catalog;
pub mod domain;
pub mod evaluator;
pub mod leaderboard;
pub mod obs;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod protocol;
pub mod selector;
pub mod telemetry;

pub use catalog::{CaseCatalog, CASES_FILE_ENV};
pub use domain::{
    EvaluationResult, GraderError, GroupDisposition, GroupOutcome, LeaderboardEntry, Result,
    RunReport,
};
pub use evaluator::{BidEvaluator, CASE_NOT_FOUND_FEEDBACK};
pub use leaderboard::{rank, LeaderboardAggregator};
pub use parser::{
    parse_evaluation, parse_winning_ordinal, quality_markers, MarkerSet, ParseError,
    PARSE_ERROR_NOTICE,
};
pub use pipeline::{group_by_case, EvaluationPipeline, SKIPPED_FEEDBACK, WINNER_FEEDBACK};
pub use protocol::{Consultation, ReasoningProtocol, REASONING_COOLDOWN};
pub use selector::{Selection, WinnerSelector};

pub use obs::{
    emit_bid_evaluated, emit_group_skipped, emit_leaderboard_failed, emit_leaderboard_rebuilt,
    emit_row_write_failed, emit_run_finished, emit_run_started, emit_winner_selected, RunSpan,
};
pub use telemetry::init_tracing;

pub use sitetox_reasoning::{GeminiClient, GeminiConfig, ReasoningError, ReasoningService};
pub use sitetox_state::{
    BidRecord, BidTable, BidUpdate, EvaluationStatus, QualityTier, RowId, SheetsConfig,
    SheetsHandle, StoreError, Worksheet,
};

/// sitetox version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
