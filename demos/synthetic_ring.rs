//! Synthetic fraud ring example
//!
//! Builds a small hand-crafted transaction table containing a three-hop
//! monetary cycle, a fan-in smurfing pattern and an unrelated shell chain,
//! then runs the full detection pipeline and prints the structured result.

use chrono::{Duration, Utc};
use launder_graph_forensics::{run_pipeline, Settings, Transaction};

fn txn(id: &str, from: &str, to: &str, amount: f64, hours_offset: i64) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        sender_id: from.to_string(),
        receiver_id: to.to_string(),
        amount,
        timestamp: Utc::now() + Duration::hours(hours_offset),
    }
}

fn main() {
    env_logger::init();
    println!("=== Synthetic Fraud Ring Demo ===\n");

    let mut rows = Vec::new();

    // A three-hop cycle: MULE-A -> MULE-B -> MULE-C -> MULE-A.
    rows.push(txn("C1", "MULE-A", "MULE-B", 50_000.0, 0));
    rows.push(txn("C2", "MULE-B", "MULE-C", 49_000.0, 4));
    rows.push(txn("C3", "MULE-C", "MULE-A", 48_000.0, 8));

    // A fan-in: ten unique senders paying COLLECTOR within hours.
    for i in 0..10 {
        rows.push(txn(&format!("F{i}"), &format!("SRC-{i}"), "COLLECTOR", 900.0, i));
    }

    // A shell chain: HUB -> s1 -> s2 -> s3 -> SINK, with the hub and sink
    // each kept busy elsewhere so they never classify as shells themselves.
    rows.push(txn("S1", "HUB", "s1", 5_000.0, 20));
    rows.push(txn("S2", "s1", "s2", 5_000.0, 21));
    rows.push(txn("S3", "s2", "s3", 5_000.0, 22));
    rows.push(txn("S4", "s3", "SINK", 5_000.0, 23));
    for i in 0..4 {
        rows.push(txn(&format!("HUB-BUSY-{i}"), "HUB", &format!("NOISE-{i}"), 10.0, 24 + i));
        rows.push(txn(&format!("SINK-BUSY-{i}"), &format!("NOISE2-{i}"), "SINK", 10.0, 24 + i));
    }

    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).expect("synthetic rows satisfy the input contract");

    println!("Accounts analyzed: {}", result.summary.accounts_analyzed);
    println!("Suspicious accounts: {}", result.summary.suspicious_accounts);
    println!("Rings found: {}\n", result.summary.rings_found);

    for account in &result.suspicious_accounts {
        println!(
            "  {:<12} score={:>5.1} ring={:<10} patterns={:?}",
            account.account_id, account.suspicion_score, account.ring_id, account.patterns
        );
    }

    println!();
    for ring in &result.rings {
        println!(
            "  {} [{}] risk={:.1} members={:?}",
            ring.ring_id, ring.pattern_type, ring.risk_score, ring.members
        );
    }
}
