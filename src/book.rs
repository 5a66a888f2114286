//! A keyed collection of lotteries with cumulative reward totals.
//!
//! An explicit owning type rather than a map subclass: one `ForecastLedger`
//! per question key, plus a [`RewardTally`] the caller feeds settlement
//! listings into. The tally is the only cross-lottery state.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ledger::{ForecastLedger, LedgerConfig, Reward, RewardTally};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LotteryBook {
    ledgers: BTreeMap<String, ForecastLedger>,
    tally: RewardTally,
}

impl LotteryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an empty lottery under `key`, replacing any existing one, and
    /// return a handle to it.
    pub fn add(&mut self, key: &str) -> &mut ForecastLedger {
        self.add_with_config(key, LedgerConfig::default())
    }

    pub fn add_with_config(&mut self, key: &str, config: LedgerConfig) -> &mut ForecastLedger {
        let ledger = ForecastLedger::with_config(config);
        match self.ledgers.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(ledger);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(ledger),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ForecastLedger> {
        self.ledgers.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ForecastLedger> {
        self.ledgers.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ForecastLedger> {
        self.ledgers.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ledgers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    /// Fold a settlement listing into the cumulative totals.
    pub fn record_rewards(&mut self, rewards: &[Reward]) {
        self.tally.record(rewards);
    }

    /// Cumulative consolidated rewards across every settlement recorded.
    pub fn cumulative_rewards(&self) -> Vec<Reward> {
        self.tally.consolidated()
    }

    pub fn tally(&self) -> &RewardTally {
        &self.tally
    }
}
