//! Quarantine cutoff rule.
//!
//! When a truth arrives at time `t` for horizon `(k, tau)`, only forecasts
//! locked in at or before the cutoff may be judged against it. The cutoff
//! enforces both kinds of lookahead at once: the submission must predate the
//! k-th most recent prior truth arrival, and predate `t` by at least `tau`
//! seconds.

/// Sentinel cutoff guaranteeing that no submission qualifies yet.
pub const NEG_INF_CUTOFF: i64 = i64::MIN / 2;

/// Latest submission time still eligible to be judged against a truth
/// arriving at `t`.
///
/// `previous_times` are the truth-arrival times recorded so far, in
/// non-decreasing order, including the arrival at `t` itself when the caller
/// records before settling.
pub fn cutoff_time(previous_times: &[i64], t: i64, k: u32, tau: i32) -> i64 {
    let n = previous_times.len();
    let tau = tau as i64;
    if k == 1 {
        t - tau
    } else if k > 1 && n >= k as usize {
        previous_times[n - k as usize] - tau
    } else {
        NEG_INF_CUTOFF
    }
}
