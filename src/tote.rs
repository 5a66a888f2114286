//! Open/close/settle tote wrapper.
//!
//! A `Tote` is a short-lived lottery with exactly three kinds of recorded
//! truth: `"opened"`, `"closed"`, and the final value. Bets are accepted
//! between open and close; once the final value is recorded, the ordinary
//! quarantine mechanism judges it against the forecasts locked in before the
//! close. There is no settlement-time special casing for totes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::{ForecastLedger, Horizon, LedgerError, Reward};

/// Truth value recorded when betting opens.
pub const OPENED: &str = "opened";
/// Truth value recorded when betting closes.
pub const CLOSED: &str = "closed";

/// The fixed tote horizon. With the close on the books, a settled value is
/// one truth-arrival ahead of it, so the cutoff lands exactly on the close
/// time and post-close bets can never qualify.
const TOTE_HORIZON: Horizon = Horizon::new(2, 0);

/// One race: a ledger plus open/close lifecycle bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tote {
    ledger: ForecastLedger,
    opened_at: Option<i64>,
    closed_at: Option<i64>,
    settled_value: Option<String>,
}

impl Tote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open betting. Repeated opens are ignored.
    pub fn open(&mut self, t: i64) -> usize {
        if self.opened_at.is_some() {
            return self.ledger.history_len();
        }
        self.opened_at = Some(t);
        self.ledger.record_truth(OPENED, t)
    }

    /// Close betting. The first close wins; later closes are ignored.
    pub fn close(&mut self, t: i64) -> usize {
        if self.closed_at.is_some() {
            return self.ledger.history_len();
        }
        self.closed_at = Some(t);
        self.ledger.record_truth(CLOSED, t)
    }

    pub fn is_open(&self) -> bool {
        self.opened_at.is_some() && self.closed_at.is_none()
    }

    pub fn opened_at(&self) -> Option<i64> {
        self.opened_at
    }

    pub fn closed_at(&self) -> Option<i64> {
        self.closed_at
    }

    pub fn settled_value(&self) -> Option<&str> {
        self.settled_value.as_deref()
    }

    /// Place a bet. Bets at or after a recorded close are rejected the same
    /// way stale submissions are: `Ok(false)`, nothing recorded. Even if
    /// such a bet slipped in, the cutoff would keep it out of every
    /// settlement; rejecting here keeps dead weight out of the ledger.
    pub fn place(
        &mut self,
        t: i64,
        owner: &str,
        values: &[&str],
        weights: Option<&[f64]>,
        amount: f64,
    ) -> Result<bool, LedgerError> {
        reject_reserved(values)?;
        if let Some(closed) = self.closed_at {
            if t >= closed {
                debug!(owner, t, closed, "bet after close rejected");
                return Ok(false);
            }
        }
        self.ledger.submit_forecast(TOTE_HORIZON, t, owner, values, weights, amount)
    }

    /// Hypothetical consolidated rewards, were `value` to arrive at time `t`.
    /// Leaves the tote untouched.
    pub fn payout(&self, value: &str, t: i64) -> Result<Vec<Reward>, LedgerError> {
        reject_reserved(&[value])?;
        let mut scratch = self.ledger.clone();
        scratch.record_truth(value, t);
        scratch.settle(TOTE_HORIZON, t, value, true)
    }

    /// Record the final value and return the consolidated rewards.
    pub fn settle(&mut self, value: &str, t: i64) -> Result<Vec<Reward>, LedgerError> {
        reject_reserved(&[value])?;
        self.ledger.record_truth(value, t);
        self.settled_value = Some(value.to_string());
        self.ledger.settle(TOTE_HORIZON, t, value, true)
    }

    pub fn ledger(&self) -> &ForecastLedger {
        &self.ledger
    }
}

fn reject_reserved(values: &[&str]) -> Result<(), LedgerError> {
    for value in values {
        if *value == OPENED || *value == CLOSED {
            return Err(LedgerError::ReservedValue {
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
