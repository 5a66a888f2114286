//! Rewards and reward bookkeeping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tolerance for comparing reward amounts built from floating arithmetic.
pub const REWARD_TOLERANCE: f64 = 1e-9;

/// One `(owner, amount)` reward line. Negative amounts are stake charges,
/// positive amounts are shares of the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub owner: String,
    pub amount: f64,
}

impl Reward {
    pub fn new(owner: impl Into<String>, amount: f64) -> Self {
        Self {
            owner: owner.into(),
            amount,
        }
    }
}

/// Sum a reward listing by owner, alphabetically, at most one entry each.
pub fn consolidate(rewards: &[Reward]) -> Vec<Reward> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for reward in rewards {
        *totals.entry(reward.owner.as_str()).or_insert(0.0) += reward.amount;
    }
    totals
        .into_iter()
        .map(|(owner, amount)| Reward::new(owner, amount))
        .collect()
}

/// True when two reward listings agree once consolidated by owner.
pub fn rewards_equivalent(a: &[Reward], b: &[Reward]) -> bool {
    let (ca, cb) = (consolidate(a), consolidate(b));
    ca.len() == cb.len()
        && ca
            .iter()
            .zip(&cb)
            .all(|(x, y)| x.owner == y.owner && (x.amount - y.amount).abs() < REWARD_TOLERANCE)
}

/// Running by-owner reward totals across many settlements.
///
/// The ledger itself never keeps balances; callers that want long-running
/// totals feed each settlement's listing into one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardTally {
    totals: BTreeMap<String, f64>,
}

impl RewardTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rewards: &[Reward]) {
        for reward in rewards {
            *self.totals.entry(reward.owner.clone()).or_insert(0.0) += reward.amount;
        }
    }

    pub fn owner_total(&self, owner: &str) -> f64 {
        self.totals.get(owner).copied().unwrap_or(0.0)
    }

    /// Consolidated view of everything recorded so far.
    pub fn consolidated(&self) -> Vec<Reward> {
        self.totals
            .iter()
            .map(|(owner, &amount)| Reward::new(owner.clone(), amount))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
