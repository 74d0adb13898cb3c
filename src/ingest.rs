//! Supplementary CSV ingest (SPEC_FULL §4.10), convenience-only and outside
//! the detection engine's hard core. Grounded directly on
//! `backend/app/engine/parser.py`'s eight-step cleaning pipeline: read raw
//! rows, require the schema, drop duplicate ids / self-loops / non-positive
//! amounts / unparseable timestamps, and refuse an empty result.

use std::collections::HashMap;
use std::io::Read;

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ForensicError;
use crate::transaction::Transaction;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValidationSummary {
    pub rows_total: usize,
    pub rows_accepted: usize,
    pub rows_skipped: usize,
    pub skip_reasons: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    transaction_id: String,
    sender_id: String,
    receiver_id: String,
    amount: String,
    timestamp: String,
}

/// Parse a CSV byte stream into validated transactions plus a summary of
/// what was skipped and why. Returns `InputContractViolation` only for
/// unrecoverable schema/content errors — unreadable CSV or an empty result
/// after cleaning.
pub fn parse_csv<R: Read>(reader: R) -> Result<(Vec<Transaction>, ValidationSummary), ForensicError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows_total = 0usize;
    let mut skip_reasons: HashMap<String, usize> = HashMap::new();
    let mut seen_ids: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut accepted = Vec::new();

    for record in rdr.deserialize::<RawRow>() {
        rows_total += 1;
        let row = match record {
            Ok(row) => row,
            Err(_) => {
                *skip_reasons.entry("unparseable_row".to_string()).or_insert(0) += 1;
                continue;
            }
        };

        if !seen_ids.insert(row.transaction_id.clone()) {
            *skip_reasons.entry("duplicate_transaction_id".to_string()).or_insert(0) += 1;
            continue;
        }

        let sender_id = row.sender_id.trim().to_string();
        let receiver_id = row.receiver_id.trim().to_string();
        if sender_id == receiver_id {
            *skip_reasons.entry("self_loop".to_string()).or_insert(0) += 1;
            continue;
        }

        let amount: f64 = match row.amount.trim().parse() {
            Ok(value) if value > 0.0 => value,
            _ => {
                *skip_reasons.entry("invalid_amount".to_string()).or_insert(0) += 1;
                continue;
            }
        };

        let timestamp = match NaiveDateTime::parse_from_str(row.timestamp.trim(), TIMESTAMP_FORMAT) {
            Ok(naive) => Utc.from_utc_datetime(&naive),
            Err(_) => {
                *skip_reasons.entry("invalid_timestamp".to_string()).or_insert(0) += 1;
                continue;
            }
        };

        accepted.push(Transaction {
            transaction_id: row.transaction_id.trim().to_string(),
            sender_id,
            receiver_id,
            amount,
            timestamp,
        });
    }

    if rows_total == 0 {
        return Err(ForensicError::InputContractViolation("CSV file is empty".to_string()));
    }
    if accepted.is_empty() {
        return Err(ForensicError::InputContractViolation(format!(
            "no valid rows remain after cleaning {rows_total} rows: {skip_reasons:?}"
        )));
    }

    let rows_accepted = accepted.len();
    let rows_skipped = rows_total - rows_accepted;
    log::info!(
        "CSV parsed: {rows_total} total, {rows_accepted} accepted, {rows_skipped} skipped {skip_reasons:?}"
    );

    Ok((
        accepted,
        ValidationSummary {
            rows_total,
            rows_accepted,
            rows_skipped,
            skip_reasons,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_clean_rows() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                    T1,A,B,100.0,2024-01-01 00:00:00\n\
                    T2,B,C,50.0,2024-01-01 01:00:00\n";
        let (rows, summary) = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(summary.rows_total, 2);
        assert_eq!(summary.rows_skipped, 0);
    }

    #[test]
    fn drops_self_loops_and_bad_amounts() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                    T1,A,A,100.0,2024-01-01 00:00:00\n\
                    T2,B,C,-5.0,2024-01-01 01:00:00\n\
                    T3,C,D,10.0,2024-01-01 02:00:00\n";
        let (rows, summary) = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(summary.skip_reasons["self_loop"], 1);
        assert_eq!(summary.skip_reasons["invalid_amount"], 1);
    }

    #[test]
    fn drops_duplicate_transaction_ids() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                    T1,A,B,100.0,2024-01-01 00:00:00\n\
                    T1,A,B,200.0,2024-01-01 01:00:00\n";
        let (rows, summary) = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(summary.skip_reasons["duplicate_transaction_id"], 1);
    }

    #[test]
    fn empty_result_is_an_error() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                    T1,A,A,100.0,2024-01-01 00:00:00\n";
        assert!(parse_csv(csv.as_bytes()).is_err());
    }
}
