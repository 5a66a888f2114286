//! Settlement scenario and adversarial ledger tests.
//!
//! The rolling-lottery scenario used throughout: horizon k=2, tau=10, truths
//! arriving every 100 seconds, two owners re-forecasting 20 seconds after
//! each arrival. bill chases the last outcome, mary holds a fixed opinion.

use crate::ledger::engine::{ForecastLedger, LedgerConfig};
use crate::ledger::error::LedgerError;
use crate::ledger::horizon::Horizon;
use crate::ledger::rewards::{consolidate, Reward};

const H: Horizon = Horizon::new(2, 10);

// =============================================================================
// HELPERS
// =============================================================================

/// Drive the rolling scenario and return each truth arrival's raw rewards.
fn rolling_scenario(ledger: &mut ForecastLedger) -> Vec<Vec<Reward>> {
    let ys: [i64; 10] = [3, 2, 1, 1, 1, 1, 1, 1, 1, 3];
    let mut per_truth = Vec::new();
    for (i, &y) in ys.iter().enumerate() {
        let t = i as i64 * 100;
        let value = y.to_string();
        ledger.record_truth(&value, t);
        per_truth.push(ledger.settle(H, t, &value, false).unwrap());

        let bill_values = [y.to_string(), (y + 1).to_string(), (y + 1).to_string()];
        let bill_refs: Vec<&str> = bill_values.iter().map(String::as_str).collect();
        ledger
            .submit_forecast(H, t + 20, "bill", &bill_refs, Some(&[0.5, 0.25, 0.25]), 1.0)
            .unwrap();
        ledger
            .submit_forecast(H, t + 20, "mary", &["1", "2", "3"], Some(&[0.4, 0.4, 0.2]), 1.5)
            .unwrap();
    }
    per_truth
}

fn assert_rewards_close(actual: &[Reward], expected: &[(&str, f64)]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "reward count mismatch: {actual:?} vs {expected:?}"
    );
    for (a, (owner, amount)) in actual.iter().zip(expected) {
        assert_eq!(a.owner, *owner);
        assert!(
            (a.amount - amount).abs() < 1e-9,
            "{}: expected {amount}, got {}",
            a.owner,
            a.amount
        );
    }
}

// =============================================================================
// REFERENCE SCENARIO
// =============================================================================

#[test]
fn test_rolling_scenario_early_truths_pay_nothing() {
    let mut ledger = ForecastLedger::new();
    let per_truth = rolling_scenario(&mut ledger);
    // no bets at the first truth, nothing committed early enough at the second
    assert!(per_truth[0].is_empty());
    assert!(per_truth[1].is_empty());
}

#[test]
fn test_rolling_scenario_truth_index_two() {
    let mut ledger = ForecastLedger::new();
    let per_truth = rolling_scenario(&mut ledger);

    // Only mary's first forecast beat the cutoff; bill had not yet put
    // weight on 1. mary takes the whole pool while bill is charged.
    assert_rewards_close(
        &per_truth[2],
        &[("bill", -1.0), ("mary", -1.5), ("mary", 2.5)],
    );
    assert_rewards_close(
        &consolidate(&per_truth[2]),
        &[("bill", -1.0), ("mary", 1.0)],
    );
}

#[test]
fn test_rolling_scenario_truth_index_four() {
    let mut ledger = ForecastLedger::new();
    let per_truth = rolling_scenario(&mut ledger);

    // By t=400 both owners hold qualifying forecasts with weight on 1;
    // the pool of 2.5 splits in proportion to 0.5 (bill) vs 0.6 (mary).
    assert_rewards_close(
        &per_truth[4],
        &[
            ("bill", -1.0),
            ("mary", -1.5),
            ("bill", 1.1363636363636362),
            ("mary", 1.3636363636363638),
        ],
    );

    let consolidated = consolidate(&per_truth[4]);
    assert_rewards_close(
        &consolidated,
        &[
            ("bill", -1.0 + 1.1363636363636362),
            ("mary", -1.5 + 1.3636363636363638),
        ],
    );
}

#[test]
fn test_settlements_with_winners_are_zero_sum() {
    let mut ledger = ForecastLedger::new();
    for rewards in rolling_scenario(&mut ledger) {
        if rewards.iter().any(|r| r.amount > 0.0) {
            let net: f64 = consolidate(&rewards).iter().map(|r| r.amount).sum();
            assert!(net.abs() < 1e-9, "settlement leaked {net}");
        }
    }
}

// =============================================================================
// QUARANTINE EDGE CASES
// =============================================================================

#[test]
fn test_empty_before_quorum() {
    let mut ledger = ForecastLedger::new();
    let h = Horizon::new(3, 10);
    ledger
        .submit_forecast(h, 0, "bill", &["a"], None, 1.0)
        .unwrap();
    ledger.record_truth("a", 100);
    ledger.record_truth("a", 200);

    // two truths recorded, k=3 demands three
    let rewards = ledger.settle(h, 200, "a", false).unwrap();
    assert!(rewards.is_empty());
}

#[test]
fn test_bet_exactly_at_cutoff_is_charged_but_cannot_win() {
    let mut ledger = ForecastLedger::new();
    let h = Horizon::new(1, 10);
    // cutoff for a truth at t=100 is 90; the bet lands exactly there
    ledger
        .submit_forecast(h, 90, "bill", &["a"], None, 1.0)
        .unwrap();
    ledger.record_truth("a", 100);

    let rewards = ledger.settle(h, 100, "a", false).unwrap();
    assert_rewards_close(&rewards, &[("bill", -1.0)]);
}

#[test]
fn test_superseded_bets_do_not_win() {
    let mut ledger = ForecastLedger::new();
    let h = Horizon::new(1, 10);
    ledger
        .submit_forecast(h, 0, "bill", &["a"], None, 1.0)
        .unwrap();
    // bill walks away from "a" before the cutoff
    ledger
        .submit_forecast(h, 50, "bill", &["b"], None, 1.0)
        .unwrap();
    ledger.record_truth("a", 200);

    // the stale bet on "a" is visible but no longer bill's position
    let rewards = ledger.settle(h, 200, "a", false).unwrap();
    assert_rewards_close(&rewards, &[("bill", -1.0)]);
}

#[test]
fn test_late_bet_excluded_from_pool_and_winners() {
    let mut ledger = ForecastLedger::new();
    let h = Horizon::new(1, 10);
    ledger
        .submit_forecast(h, 0, "bill", &["a"], None, 1.0)
        .unwrap();
    // sally commits after the cutoff for the truth at t=100
    ledger
        .submit_forecast(h, 95, "sally", &["a"], None, 2.0)
        .unwrap();
    ledger.record_truth("a", 100);

    let rewards = ledger.settle(h, 100, "a", true).unwrap();
    // sally is neither charged nor paid; bill wins his own stake back
    assert_rewards_close(&rewards, &[("bill", 0.0)]);
}

#[test]
fn test_degenerate_settlement_is_an_error() {
    let mut ledger = ForecastLedger::new();
    let h = Horizon::new(1, 10);
    // the only quarantined bet on "b" carries zero weight
    ledger
        .submit_forecast(h, 0, "bill", &["a", "b"], Some(&[1.0, 0.0]), 1.0)
        .unwrap();
    ledger.record_truth("b", 100);

    let err = ledger.settle(h, 100, "b", false).unwrap_err();
    assert!(matches!(err, LedgerError::DegenerateSettlement { .. }));
}

// =============================================================================
// DEDUP GUARD
// =============================================================================

#[test]
fn test_stale_submission_has_no_observable_effect() {
    let mut ledger = ForecastLedger::new();
    ledger
        .submit_forecast(H, 10, "bill", &["a"], None, 1.0)
        .unwrap();
    ledger
        .submit_forecast(H, 20, "bill", &["b"], None, 2.0)
        .unwrap();

    let mut replay = ledger.clone();
    assert_eq!(
        replay.submit_forecast(H, 10, "bill", &["c"], None, 9.0),
        Ok(false)
    );
    // only the rejection counter may move; every index stays untouched
    replay.stats.rejected_forecasts -= 1;
    assert_eq!(replay, ledger);
}

// =============================================================================
// HISTORY TRIMMING
// =============================================================================

#[test]
fn test_history_trims_to_exact_bound() {
    let mut ledger = ForecastLedger::with_config(LedgerConfig { history_bound: 10 });
    for i in 0..11i64 {
        ledger.record_truth(&format!("v{i}"), i);
    }
    // 11 entries is within the 10% slack
    assert_eq!(ledger.history_len(), 11);

    assert_eq!(ledger.record_truth("v11", 11), 10);
    let truths: Vec<_> = ledger.truth_history().collect();
    assert_eq!(truths.len(), 10);
    assert_eq!(truths[0], (2, "v2"));
    assert_eq!(truths[9], (11, "v11"));
}

// =============================================================================
// SERIALIZATION ROUND-TRIP
// =============================================================================

#[test]
fn test_full_state_round_trips_through_json() {
    let mut ledger = ForecastLedger::new();
    rolling_scenario(&mut ledger);
    // a second horizon with negative tau, to exercise the key encoding
    ledger
        .submit_forecast(Horizon::new(1, -30), 5, "alice", &["x"], None, 0.5)
        .unwrap();

    let json = ledger.to_json().unwrap();
    let restored = ForecastLedger::from_json(&json).unwrap();
    assert_eq!(restored, ledger);
}

#[test]
fn test_round_trip_through_snapshot_file() {
    let mut ledger = ForecastLedger::new();
    rolling_scenario(&mut ledger);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    std::fs::write(&path, ledger.to_json().unwrap()).unwrap();

    let restored = ForecastLedger::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored, ledger);

    // a restored ledger keeps settling identically
    let mut a = ledger.clone();
    let mut b = restored;
    let ra = a.settle(H, 1000, "1", true).unwrap();
    let rb = b.settle(H, 1000, "1", true).unwrap();
    assert_eq!(ra, rb);
}
