//! Forecast horizons.
//!
//! A horizon identifies one forecasting problem: predict the outcome revealed
//! `k` truth-arrivals ahead and/or `tau` seconds ahead. Horizons double as map
//! keys throughout the ledger, and as JSON object keys in serialized state,
//! so `(k, tau)` packs reversibly into a single `i64`.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `(k, tau)` forecasting horizon.
///
/// `k` counts truth-arrival events of lookahead, `tau` counts seconds.
/// A horizon requiring zero lookahead in both senses is meaningless, so a
/// horizon is valid only when `k >= 1` or `tau > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Horizon {
    /// Steps ahead, counted in truth arrivals.
    pub k: u32,
    /// Seconds ahead. May be negative for diagnostic horizons.
    pub tau: i32,
}

impl Horizon {
    pub const fn new(k: u32, tau: i32) -> Self {
        Self { k, tau }
    }

    /// True when the horizon demands some lookahead.
    pub fn is_valid(&self) -> bool {
        self.k >= 1 || self.tau > 0
    }

    /// Pack `(k, tau)` into one non-negative `i64` key.
    ///
    /// `tau` is zigzag-encoded into the low 32 bits, `k` occupies the high
    /// bits. Requires `k <= i32::MAX`; far beyond any practical lookahead.
    pub fn packed(&self) -> i64 {
        debug_assert!(self.k <= i32::MAX as u32, "horizon k out of packable range");
        ((self.k as i64) << 32) | (zigzag(self.tau) as i64)
    }

    /// Inverse of [`Horizon::packed`]. Returns `None` for keys no horizon
    /// packs to.
    pub fn from_packed(packed: i64) -> Option<Self> {
        if packed < 0 {
            return None;
        }
        let k = (packed >> 32) as u32;
        let tau = unzigzag((packed & 0xFFFF_FFFF) as u32);
        Some(Self { k, tau })
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k={},tau={}s", self.k, self.tau)
    }
}

// Serialized as the decimal string of the packed key so horizons can act as
// JSON object keys.
impl Serialize for Horizon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.packed())
    }
}

impl<'de> Deserialize<'de> for Horizon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        let packed: i64 = key
            .parse()
            .map_err(|_| D::Error::custom(format!("horizon key is not an integer: {key:?}")))?;
        Horizon::from_packed(packed)
            .ok_or_else(|| D::Error::custom(format!("horizon key out of range: {packed}")))
    }
}

fn zigzag(tau: i32) -> u32 {
    ((tau << 1) ^ (tau >> 31)) as u32
}

fn unzigzag(z: u32) -> i32 {
    ((z >> 1) as i32) ^ -((z & 1) as i32)
}
