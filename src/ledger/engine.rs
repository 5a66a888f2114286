//! Horizon-indexed forecast ledger and settlement engine.
//!
//! One `ForecastLedger` owns every bet, stake and truth observation for a
//! collection of independent horizons, and settles each truth arrival by
//! splitting the pool among the owners whose quarantined forecasts put
//! weight on the realized value.
//!
//! # State
//!
//! - bet-by-value index: horizon -> value -> (time, owner, amount) entries
//! - stake-by-owner index: horizon -> owner -> (time, amount) entries
//! - forecast snapshots: horizon -> owner -> latest accepted forecast view
//! - dedup guard: horizon -> owner -> last accepted submission time
//! - truth history: parallel time/value sequences, append-only, trimmable
//!
//! All maps are ordered so iteration, settlement output and serialized state
//! are deterministic.
//!
//! # Invariants
//!
//! 1. Per (horizon, owner), accepted submission times strictly increase.
//! 2. A forecast either fully applies or leaves no trace: validation happens
//!    before the first mutation.
//! 3. `time_history` and `value_history` have equal length at all times.
//! 4. Consolidated rewards for a settlement with winners sum to zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ledger::error::LedgerError;
use crate::ledger::horizon::Horizon;
use crate::ledger::quarantine::cutoff_time;
use crate::ledger::rewards::{consolidate, Reward};
use crate::ledger::weights::ensure_normalized;

// =============================================================================
// LEDGER ENTRIES
// =============================================================================

/// One slice of an accepted forecast, indexed under a single candidate value.
/// `amount` is the owner's stake times the weight placed on that value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetEntry {
    pub time: i64,
    pub owner: String,
    pub amount: f64,
}

/// One accepted forecast's total stake, indexed under its owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeEntry {
    pub time: i64,
    pub amount: f64,
}

/// Informational view of an owner's most recent accepted forecast for one
/// horizon. Not consulted by settlement; the bet/stake indices are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    /// (value, weight) pairs, sorted by value then weight.
    pub probability: Vec<(String, f64)>,
    /// (value, weight * stake) pairs, sorted by value then weight.
    pub money: Vec<(String, f64)>,
}

// =============================================================================
// CONFIG & STATS
// =============================================================================

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Truth history is truncated back to this many entries once it
    /// overshoots the bound by 10%.
    pub history_bound: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { history_bound: 10_000 }
    }
}

/// Operation counters, serialized alongside the state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub accepted_forecasts: u64,
    pub rejected_forecasts: u64,
    pub truths_recorded: u64,
    pub settlements_with_rewards: u64,
    pub empty_settlements: u64,
}

// =============================================================================
// LEDGER STATE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LedgerState {
    /// horizon -> value -> every bet ever recorded on that value.
    bets: BTreeMap<Horizon, BTreeMap<String, Vec<BetEntry>>>,
    /// horizon -> owner -> chronological stake entries.
    stakes: BTreeMap<Horizon, BTreeMap<String, Vec<StakeEntry>>>,
    /// horizon -> owner -> latest accepted forecast view.
    forecasts: BTreeMap<Horizon, BTreeMap<String, ForecastSnapshot>>,
    /// horizon -> owner -> last accepted submission time.
    last_accepted: BTreeMap<Horizon, BTreeMap<String, i64>>,
    time_history: Vec<i64>,
    value_history: Vec<String>,
}

/// The forecast ledger and settlement engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastLedger {
    config: LedgerConfig,
    state: LedgerState,
    pub stats: LedgerStats,
}

impl ForecastLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Record one owner's forecast for a horizon.
    ///
    /// Returns `Ok(true)` on acceptance, `Ok(false)` when the submission is
    /// stale relative to the owner's last accepted time for this horizon
    /// (ties rejected; no backdating). Malformed input is an error and
    /// mutates nothing.
    pub fn submit_forecast(
        &mut self,
        horizon: Horizon,
        t: i64,
        owner: &str,
        values: &[&str],
        weights: Option<&[f64]>,
        amount: f64,
    ) -> Result<bool, LedgerError> {
        if !horizon.is_valid() {
            return Err(LedgerError::InvalidHorizon {
                k: horizon.k,
                tau: horizon.tau,
            });
        }
        let weights = ensure_normalized(values.len(), weights)?;

        let guard = self.state.last_accepted.entry(horizon).or_default();
        if let Some(&last) = guard.get(owner) {
            if t <= last {
                self.stats.rejected_forecasts += 1;
                debug!(owner, t, last, horizon = %horizon, "stale forecast rejected");
                return Ok(false);
            }
        }
        guard.insert(owner.to_string(), t);

        let mut probability: Vec<(String, f64)> = values
            .iter()
            .zip(&weights)
            .map(|(v, &w)| (v.to_string(), w))
            .collect();
        let mut money: Vec<(String, f64)> = values
            .iter()
            .zip(&weights)
            .map(|(v, &w)| (v.to_string(), w * amount))
            .collect();
        sort_pairs(&mut probability);
        sort_pairs(&mut money);
        self.state
            .forecasts
            .entry(horizon)
            .or_default()
            .insert(owner.to_string(), ForecastSnapshot { probability, money });

        self.state
            .stakes
            .entry(horizon)
            .or_default()
            .entry(owner.to_string())
            .or_default()
            .push(StakeEntry { time: t, amount });

        let by_value = self.state.bets.entry(horizon).or_default();
        for (value, &weight) in values.iter().zip(&weights) {
            by_value.entry(value.to_string()).or_default().push(BetEntry {
                time: t,
                owner: owner.to_string(),
                amount: amount * weight,
            });
        }

        self.stats.accepted_forecasts += 1;
        Ok(true)
    }

    // =========================================================================
    // TRUTH HISTORY
    // =========================================================================

    /// Append an arriving ground truth. Returns the new history length.
    ///
    /// Callers append in time order; the ledger does not reorder. Once the
    /// history overshoots the configured bound by 10% it is truncated back
    /// to the bound, both sequences together, most recent entries kept.
    pub fn record_truth(&mut self, value: &str, t: i64) -> usize {
        debug_assert_eq!(
            self.state.time_history.len(),
            self.state.value_history.len(),
            "truth history out of sync"
        );
        self.state.time_history.push(t);
        self.state.value_history.push(value.to_string());
        self.stats.truths_recorded += 1;

        let bound = self.config.history_bound;
        let len = self.state.time_history.len();
        if len as f64 > 1.1 * bound as f64 {
            let removed = len - bound;
            self.state.time_history.drain(..removed);
            self.state.value_history.drain(..removed);
            debug!(removed, bound, "truth history trimmed");
        }
        self.state.time_history.len()
    }

    // =========================================================================
    // SETTLEMENT
    // =========================================================================

    /// Settle a truth `value` arriving at time `t` against one horizon.
    ///
    /// Empty listings are the normal "nothing to do" outcome: not enough
    /// history for the quarantine, no bets under the horizon, or no bets on
    /// the realized value. With winners present, every pool participant is
    /// charged their qualifying stake and winners split the whole pool in
    /// proportion to winning stake; the consolidated listing sums to zero.
    pub fn settle(
        &mut self,
        horizon: Horizon,
        t: i64,
        value: &str,
        consolidate_by_owner: bool,
    ) -> Result<Vec<Reward>, LedgerError> {
        let t_cutoff = cutoff_time(&self.state.time_history, t, horizon.k, horizon.tau);

        let matching = self
            .state
            .bets
            .get(&horizon)
            .and_then(|by_value| by_value.get(value));
        let (Some(matching), Some(stakes_by_owner)) = (matching, self.state.stakes.get(&horizon))
        else {
            self.stats.empty_settlements += 1;
            return Ok(Vec::new());
        };
        if t_cutoff >= t {
            self.stats.empty_settlements += 1;
            return Ok(Vec::new());
        }

        // Bets on the realized value that were locked in before the cutoff.
        let quarantined: Vec<&BetEntry> =
            matching.iter().filter(|bet| bet.time <= t_cutoff).collect();

        // Each owner's qualifying snapshot: the time of their latest stake
        // entry strictly before the cutoff. Owners whose only activity sits
        // at or past the cutoff have no snapshot and produce no winners.
        let mut snapshot_times: BTreeMap<&str, i64> = BTreeMap::new();
        for bet in &quarantined {
            if snapshot_times.contains_key(bet.owner.as_str()) {
                continue;
            }
            let snapshot = stakes_by_owner
                .get(&bet.owner)
                .and_then(|entries| entries.iter().rev().find(|s| s.time < t_cutoff));
            if let Some(entry) = snapshot {
                snapshot_times.insert(bet.owner.as_str(), entry.time);
            }
        }

        // Only bets placed as part of the owner's snapshot forecast win;
        // older superseded bets on the same value are discarded.
        let winners: Vec<(&str, f64)> = quarantined
            .iter()
            .filter(|bet| snapshot_times.get(bet.owner.as_str()) == Some(&bet.time))
            .map(|bet| (bet.owner.as_str(), bet.amount))
            .collect();
        let total_winner_money: f64 = winners.iter().map(|(_, amount)| amount).sum();

        // The pool: every owner's latest stake at or before the cutoff.
        let mut pool: Vec<(&str, f64)> = Vec::new();
        for (owner, entries) in stakes_by_owner {
            if let Some(entry) = entries.iter().rev().find(|s| s.time <= t_cutoff) {
                pool.push((owner.as_str(), entry.amount));
            }
        }
        let total_money: f64 = pool.iter().map(|(_, amount)| amount).sum();

        if !winners.is_empty() && total_winner_money <= 0.0 {
            warn!(horizon = %horizon, value, "winners hold zero stake");
            return Err(LedgerError::DegenerateSettlement {
                horizon,
                value: value.to_string(),
            });
        }

        let mut rewards: Vec<Reward> = pool
            .iter()
            .map(|&(owner, stake)| Reward::new(owner, -stake))
            .collect();
        rewards.extend(
            winners
                .iter()
                .map(|&(owner, stake)| Reward::new(owner, stake * total_money / total_winner_money)),
        );

        if rewards.is_empty() {
            self.stats.empty_settlements += 1;
        } else {
            self.stats.settlements_with_rewards += 1;
        }

        if consolidate_by_owner {
            Ok(consolidate(&rewards))
        } else {
            Ok(rewards)
        }
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    /// The owner's most recent accepted forecast for a horizon, if any.
    pub fn current_forecast(&self, horizon: Horizon, owner: &str) -> Option<&ForecastSnapshot> {
        self.state.forecasts.get(&horizon)?.get(owner)
    }

    /// Time of the owner's last accepted submission for a horizon.
    pub fn last_accepted_time(&self, horizon: Horizon, owner: &str) -> Option<i64> {
        self.state.last_accepted.get(&horizon)?.get(owner).copied()
    }

    /// Horizons that have seen at least one accepted forecast.
    pub fn horizons(&self) -> impl Iterator<Item = Horizon> + '_ {
        self.state.last_accepted.keys().copied()
    }

    pub fn history_len(&self) -> usize {
        self.state.time_history.len()
    }

    /// Recorded truths, oldest first.
    pub fn truth_history(&self) -> impl Iterator<Item = (i64, &str)> + '_ {
        self.state
            .time_history
            .iter()
            .copied()
            .zip(self.state.value_history.iter().map(String::as_str))
    }

    // =========================================================================
    // SERIALIZATION
    // =========================================================================

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn sort_pairs(pairs: &mut [(String, f64)]) {
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
}

// =============================================================================
// TESTS
// =============================================================================
