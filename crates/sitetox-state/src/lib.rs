//! Sitetox-State: Worksheet Backend for sitetox
//!
//! This crate provides the persistence layer for the bid grading pipeline.
//! It handles all I/O with the shared spreadsheet: reading submitted bids,
//! writing evaluation results cell by cell, and overwriting the leaderboard.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: header-driven column resolution and last-write-wins row updates.
//!
//! ## Key Components
//!
//! - `Worksheet`: backend-agnostic grid of cells (row 1 is the header)
//! - `SheetsHandle`: Google Sheets connection that hands out worksheets
//! - `BidTable`: typed view over the bid worksheet (`BidRecord`, `BidUpdate`)
//! - `fakes::MemoryWorksheet`: in-memory worksheet for tests

pub mod bid_table;
mod error;
pub mod fakes;
mod handle;
pub mod schema;
pub mod storage_traits;

pub use bid_table::{BidTable, WRITE_COOLDOWN};
pub use error::StoreError;
pub use handle::{SheetsConfig, SheetsHandle, SheetsWorksheet};
pub use schema::{
    coerce_points, columns, BidRecord, BidUpdate, EvaluationStatus, HeaderIndex, QualityTier,
    RowId,
};
pub use storage_traits::{column_letters, CellUpdate, StoreResult, Worksheet};
