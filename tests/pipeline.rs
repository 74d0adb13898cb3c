//! End-to-end pipeline scenarios, one per literal example in the detection
//! engine's specification: a triangle cycle, fan-in within and beyond the
//! smurfing window, payroll and merchant suppression, and a shell chain.

use std::io::Write;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use launder_graph_forensics::{ingest, run_pipeline, Settings, Transaction};

fn txn(id: &str, from: &str, to: &str, amount: f64, minutes_offset: i64) -> Transaction {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    Transaction {
        transaction_id: id.to_string(),
        sender_id: from.to_string(),
        receiver_id: to.to_string(),
        amount,
        timestamp: Utc.from_utc_datetime(&base) + Duration::minutes(minutes_offset),
    }
}

#[test]
fn triangle_cycle_forms_one_ring() {
    let rows = vec![
        txn("T1", "A", "B", 5000.0, 0),
        txn("T2", "B", "C", 5000.0, 60),
        txn("T3", "C", "A", 5000.0, 120),
    ];
    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).unwrap();

    assert_eq!(result.rings.len(), 1);
    assert_eq!(result.rings[0].ring_id, "RING_001");
    assert_eq!(result.rings[0].members, vec!["A", "B", "C"]);
    assert_eq!(result.rings[0].pattern_type, "cycle");

    for account in ["A", "B", "C"] {
        let entry = result.suspicious_accounts.iter().find(|a| a.account_id == account).unwrap();
        assert!(entry.patterns.contains(&"cycle_length_3".to_string()));
    }
}

#[test]
fn fan_in_within_the_smurfing_window_is_flagged() {
    // 14 distinct senders paying RECV a minute apart: enough unique
    // counterparties and a tight enough window to clear the suspicion
    // threshold, while staying under the in-degree where merchant
    // suppression would start discounting the score.
    let rows: Vec<Transaction> = (0..14)
        .map(|i| txn(&format!("T{i}"), &format!("S{i}"), "RECV", 500.0, i))
        .collect();
    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).unwrap();

    let recv = result.suspicious_accounts.iter().find(|a| a.account_id == "RECV");
    let recv = recv.expect("RECV should be flagged");
    assert!(recv.patterns.contains(&"smurfing_fan_in".to_string()));
}

#[test]
fn fan_in_of_ten_spread_over_ninety_hours_is_not_flagged() {
    let rows: Vec<Transaction> = (0..10)
        .map(|i| txn(&format!("T{i}"), &format!("S{i}"), "RECV", 500.0, i * 10 * 60))
        .collect();
    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).unwrap();

    assert!(!result.suspicious_accounts.iter().any(|a| a.account_id == "RECV"));
}

#[test]
fn regular_payroll_is_suppressed_below_threshold() {
    // One sender, 20 recipients, a constant amount, exact 6-minute strides.
    let rows: Vec<Transaction> = (0..20)
        .map(|i| txn(&format!("T{i}"), "PAYER", &format!("EMP{i}"), 1200.0, i * 6))
        .collect();
    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).unwrap();

    assert!(!result.suspicious_accounts.iter().any(|a| a.account_id == "PAYER"));
}

#[test]
fn pure_merchant_fan_in_is_suppressed_below_threshold() {
    let rows: Vec<Transaction> = (0..60)
        .map(|i| txn(&format!("T{i}"), &format!("CUST{i}"), "SHOP", 75.0, i * 3))
        .collect();
    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).unwrap();

    assert!(!result.suspicious_accounts.iter().any(|a| a.account_id == "SHOP"));
}

#[test]
fn shell_chain_between_two_busy_endpoints_is_flagged() {
    // A 7-hop chain through six shells, each touching only the chain (so
    // f_isolation sits near its achievable max); a large per-hop amount
    // against a small, stable noise-dominated median drives f_volume to 1.0;
    // hourly spacing keeps f_velocity high. Together that clears the
    // suspicious-score threshold, unlike the minimal 3-hop case.
    let shells = ["S1", "S2", "S3", "S4", "S5", "S6"];
    let mut rows = Vec::new();
    let chain: Vec<&str> = std::iter::once("RICH1").chain(shells.iter().copied()).chain(std::iter::once("RICH2")).collect();
    for (i, pair) in chain.windows(2).enumerate() {
        rows.push(txn(&format!("C{i}"), pair[0], pair[1], 100_000.0, i as i64 * 60));
    }
    for i in 0..10 {
        rows.push(txn(&format!("R1-{i}"), "RICH1", &format!("NOISE1-{i}"), 10.0, 1000 + i));
        rows.push(txn(&format!("R2-{i}"), &format!("NOISE2-{i}"), "RICH2", 10.0, 1000 + i));
    }
    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).unwrap();

    let cluster_members: Vec<&str> = std::iter::once("RICH1").chain(shells.iter().copied()).chain(std::iter::once("RICH2")).collect();
    for account in &cluster_members {
        assert!(
            result.suspicious_accounts.iter().any(|a| &a.account_id == account),
            "{account} should be flagged"
        );
    }
    let shell1 = result.suspicious_accounts.iter().find(|a| a.account_id == "S1").unwrap();
    assert!(shell1.patterns.contains(&"shell_intermediary".to_string()));
    let rich1 = result.suspicious_accounts.iter().find(|a| a.account_id == "RICH1").unwrap();
    assert!(rich1.patterns.contains(&"shell_source".to_string()));
}

#[test]
fn suspicious_accounts_and_rings_are_totally_ordered() {
    let rows = vec![
        txn("T1", "A", "B", 5000.0, 0),
        txn("T2", "B", "C", 5000.0, 60),
        txn("T3", "C", "A", 5000.0, 120),
    ];
    let settings = Settings::default();
    let result = run_pipeline(&rows, &settings).unwrap();

    let scores: Vec<f64> = result.suspicious_accounts.iter().map(|a| a.suspicion_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    for account in &result.suspicious_accounts {
        let mut sorted = account.patterns.clone();
        sorted.sort();
        assert_eq!(account.patterns, sorted);
    }
}

#[test]
fn csv_ingest_round_trips_through_a_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "transaction_id,sender_id,receiver_id,amount,timestamp").unwrap();
    writeln!(file, "T1,A,B,5000.00,2024-01-01 00:00:00").unwrap();
    writeln!(file, "T2,B,C,5000.00,2024-01-01 01:00:00").unwrap();
    writeln!(file, "T3,C,A,5000.00,2024-01-01 02:00:00").unwrap();
    // A self-loop row the ingest layer must drop before the engine ever sees it.
    writeln!(file, "T4,D,D,100.00,2024-01-01 03:00:00").unwrap();
    file.flush().unwrap();

    let reopened = std::fs::File::open(file.path()).unwrap();
    let (transactions, summary) = ingest::parse_csv(reopened).unwrap();

    assert_eq!(transactions.len(), 3);
    assert_eq!(summary.rows_total, 4);
    assert_eq!(summary.skip_reasons["self_loop"], 1);

    let settings = Settings::default();
    let result = run_pipeline(&transactions, &settings).unwrap();
    assert_eq!(result.rings.len(), 1);
}
