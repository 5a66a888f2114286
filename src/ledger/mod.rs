//! Forecast ledger core.
//!
//! # Architecture
//!
//! ```text
//! submit_forecast ──▶ ┌──────────────────────────────────────────┐
//! record_truth   ──▶ │              ForecastLedger               │
//! settle         ──▶ │  (bet index, stake index, dedup guard,   │
//!                     │   forecast snapshots, truth history)     │
//!                     └───────┬──────────────────┬───────────────┘
//!                             ▼                  ▼
//!                      quarantine::cutoff   rewards::consolidate
//! ```
//!
//! Submissions are judged against per-(horizon, owner) ordering guards on
//! the way in, and against the quarantine cutoff on the way out. Settlement
//! is pure bookkeeping over the indices; no wall clock is ever consulted.

pub mod engine;
pub mod error;
pub mod horizon;
pub mod quarantine;
pub mod rewards;
pub mod weights;

#[cfg(test)]
mod engine_tests;

pub use engine::{BetEntry, ForecastLedger, ForecastSnapshot, LedgerConfig, LedgerStats, StakeEntry};
pub use error::LedgerError;
pub use horizon::Horizon;
pub use quarantine::{cutoff_time, NEG_INF_CUTOFF};
pub use rewards::{consolidate, rewards_equivalent, Reward, RewardTally};
pub use weights::{ensure_normalized, NORMALIZATION_TOLERANCE};
