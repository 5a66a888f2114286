//! Forecast weight normalization.

use crate::ledger::error::LedgerError;

/// Tolerance inside which a weight vector counts as already normalized.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-8;

/// Validate and normalize a weight vector for `len` candidate values.
///
/// `None` yields uniform weights. A vector whose sum is within
/// [`NORMALIZATION_TOLERANCE`] of 1 is returned unchanged; any other
/// positive-sum vector is divided through by its sum. Length mismatches,
/// negative entries and all-zero vectors are contract violations.
pub fn ensure_normalized(len: usize, weights: Option<&[f64]>) -> Result<Vec<f64>, LedgerError> {
    if len == 0 {
        return Err(LedgerError::EmptyValues);
    }
    let Some(weights) = weights else {
        return Ok(vec![1.0 / len as f64; len]);
    };
    if weights.len() != len {
        return Err(LedgerError::LengthMismatch {
            values: len,
            weights: weights.len(),
        });
    }
    if let Some((index, &weight)) = weights.iter().enumerate().find(|(_, w)| **w < 0.0) {
        return Err(LedgerError::NegativeWeight { index, weight });
    }
    let sum: f64 = weights.iter().sum();
    if (1.0 - sum).abs() < NORMALIZATION_TOLERANCE {
        return Ok(weights.to_vec());
    }
    if sum <= 0.0 {
        return Err(LedgerError::ZeroWeightSum);
    }
    Ok(weights.iter().map(|w| w / sum).collect())
}
