//! CSV analysis example
//!
//! Reads a transaction CSV from a path given on the command line (or a
//! small built-in sample when no argument is given), parses it with the
//! ingest module, and runs the full forensic pipeline over the result.

use std::fs::File;

use launder_graph_forensics::{ingest, run_pipeline, Settings};

const SAMPLE_CSV: &str = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
T1,ACC-001,ACC-002,15000.00,2024-03-01 09:00:00\n\
T2,ACC-002,ACC-003,14800.00,2024-03-01 11:30:00\n\
T3,ACC-003,ACC-001,14500.00,2024-03-01 15:00:00\n";

fn main() {
    env_logger::init();
    println!("=== CSV Forensic Analysis ===\n");

    let path = std::env::args().nth(1);
    let (transactions, validation) = match path {
        Some(path) => {
            let file = File::open(&path).unwrap_or_else(|e| panic!("could not open {path}: {e}"));
            ingest::parse_csv(file).expect("CSV failed the input contract")
        }
        None => {
            println!("(no path given, using the built-in sample)\n");
            ingest::parse_csv(SAMPLE_CSV.as_bytes()).expect("sample CSV is well-formed")
        }
    };

    println!(
        "Ingest: {} total, {} accepted, {} skipped {:?}\n",
        validation.rows_total, validation.rows_accepted, validation.rows_skipped, validation.skip_reasons
    );

    let settings = Settings::default();
    let result = run_pipeline(&transactions, &settings).expect("validated rows satisfy the input contract");

    println!("Accounts analyzed: {}", result.summary.accounts_analyzed);
    println!("Suspicious accounts: {}", result.summary.suspicious_accounts);
    println!("Rings found: {}", result.summary.rings_found);
    println!("Pipeline time: {}ms\n", result.summary.pipeline_duration_ms);

    for account in &result.suspicious_accounts {
        println!(
            "  {:<12} score={:>5.1} ring={:<10} patterns={:?}",
            account.account_id, account.suspicion_score, account.ring_id, account.patterns
        );
    }

    if std::env::args().any(|a| a == "--json") {
        println!("\n{}", serde_json::to_string_pretty(&result).expect("result is serializable"));
    }
}
