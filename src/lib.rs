//! Pari-mutuel forecast ledgers with temporal quarantine.
//!
//! Participants submit weighted value guesses for outcomes that have not
//! arrived yet; when a truth arrives, the pool of qualifying stakes is
//! redistributed to the owners whose forecasts put weight on it. The
//! quarantine cutoff guarantees winning forecasts were locked in before
//! they could have been informed by the judged truth.

pub mod book;
pub mod ledger;
pub mod tote;

pub use book::LotteryBook;
pub use ledger::{
    ForecastLedger, Horizon, LedgerConfig, LedgerError, LedgerStats, Reward, RewardTally,
};
pub use tote::Tote;
