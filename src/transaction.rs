//! The `Transaction` input type (spec §3) and the `AlgorithmResult` record
//! each detector hands back to the fusion stage.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patterns::Pattern;

/// A single validated transaction row. Never mutated after parse — the
/// graph builder and every detector only ever read a shared `&[Transaction]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Defensive contract check matching spec §3's invariants. The engine
    /// assumes the caller already validated these, but checks anyway since
    /// the cost is one pass over the slice and the alternative is undefined
    /// behavior deep inside a detector.
    pub fn validate(&self) -> Result<(), crate::ForensicError> {
        if self.sender_id == self.receiver_id {
            return Err(crate::ForensicError::InputContractViolation(format!(
                "self-loop on transaction {}: sender == receiver == {}",
                self.transaction_id, self.sender_id
            )));
        }
        if !(self.amount > 0.0) {
            return Err(crate::ForensicError::InputContractViolation(format!(
                "non-positive amount {} on transaction {}",
                self.amount, self.transaction_id
            )));
        }
        Ok(())
    }
}

/// Internal result produced by a single detector. Not exposed outside the
/// crate — consumed by suppression, scoring, and the ring merger.
///
/// `account_flags` preserves first-seen order per account and deduplicates
/// automatically (mirrors the teacher's dedup-on-insert `FraudDetector`
/// history bookkeeping, generalized to pattern labels instead of raw rows).
#[derive(Debug, Clone, Default)]
pub struct AlgorithmResult {
    pub account_flags: HashMap<String, Vec<Pattern>>,
    pub account_scores: HashMap<String, f64>,
    pub clusters: Vec<HashSet<String>>,
}

impl AlgorithmResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern label to an account, deduplicating automatically.
    pub fn add_flag(&mut self, account_id: &str, pattern: Pattern) {
        let flags = self.account_flags.entry(account_id.to_string()).or_default();
        if !flags.contains(&pattern) {
            flags.push(pattern);
        }
    }

    /// Record `score` as the account's category score if it exceeds the
    /// current maximum (every detector keeps the best per-account score).
    pub fn raise_score(&mut self, account_id: &str, score: f64) {
        let entry = self.account_scores.entry(account_id.to_string()).or_insert(0.0);
        if score > *entry {
            *entry = score;
        }
    }
}
