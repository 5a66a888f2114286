//! One-off race lottery demo.
//!
//! Mocks a single race as a tote. Tickets are 3-of-6 number combinations
//! written "1-3-4"; two players buy before the close, a third tries after,
//! and the race settles on a randomly drawn ticket.
//!
//! Usage:
//!   cargo run --bin one_off_race

use anyhow::Result;
use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::info;

use toteboard::Tote;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("one_off_race=info".parse()?),
        )
        .init();

    let tickets = combinations(&["1", "2", "3", "4", "5", "6"], 3);
    let now = Utc::now().timestamp();

    let mut tote = Tote::new();
    tote.open(now);
    info!(tickets = tickets.len(), "tote opened");

    tote.place(now + 10, "bill", &["1-3-4", "1-2-5"], None, 1.0)?;
    tote.place(now + 10, "mary", &["2-3-4", "4-5-6", "1-2-5"], None, 1.0)?;
    tote.close(now + 20);

    // Too late, sally.
    let accepted = tote.place(now + 30, "sally", &["2-3-4"], None, 1.0)?;
    info!(accepted, "sally bet after the close");

    // Hypothetical payouts: a sole winner, a shared ticket, an unbacked one.
    for value in ["1-3-4", "1-2-5", "1-3-6"] {
        let rewards = tote.payout(value, now + 40)?;
        info!(value, ?rewards, "hypothetical payout");
    }

    let winner = tickets
        .choose(&mut rand::thread_rng())
        .expect("ticket list is non-empty");
    let rewards = tote.settle(winner, now + 60)?;
    info!(winner = %winner, ?rewards, "race settled");

    Ok(())
}

/// All r-of-n combinations of `items`, dash-joined in lexicographic order.
fn combinations(items: &[&str], r: usize) -> Vec<String> {
    fn go<'a>(
        items: &[&'a str],
        r: usize,
        start: usize,
        current: &mut Vec<&'a str>,
        out: &mut Vec<String>,
    ) {
        if current.len() == r {
            out.push(current.join("-"));
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            go(items, r, i + 1, current, out);
            current.pop();
        }
    }
    let mut out = Vec::new();
    go(items, r, 0, &mut Vec::new(), &mut out);
    out
}
