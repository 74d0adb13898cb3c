//! Per-account transaction views, sorted ascending by timestamp.
//!
//! The smurfing, velocity and payroll-suppression logic all need the same
//! shape: "this account's outgoing (or incoming, or combined) rows, sorted
//! by time". Building that once and sharing it keeps each detector to the
//! `O(k log k)` complexity spec §4.3 calls for, and mirrors the teacher's
//! `FraudDetector::history: HashMap<String, Vec<Transaction>>` bookkeeping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::transaction::Transaction;

/// One counterparty leg of a transaction, from a given account's viewpoint.
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    pub timestamp: DateTime<Utc>,
    pub counterparty: &'a str,
    pub amount: f64,
}

pub struct AccountIndex<'a> {
    by_sender: HashMap<&'a str, Vec<Leg<'a>>>,
    by_receiver: HashMap<&'a str, Vec<Leg<'a>>>,
    /// Combined sent+received timestamps per account, used by dormancy-break
    /// (spec §4.5 uses "combined sent+received timestamps" there only).
    by_account: HashMap<&'a str, Vec<DateTime<Utc>>>,
}

impl<'a> AccountIndex<'a> {
    pub fn build(transactions: &'a [Transaction]) -> Self {
        let mut by_sender: HashMap<&str, Vec<Leg>> = HashMap::new();
        let mut by_receiver: HashMap<&str, Vec<Leg>> = HashMap::new();
        let mut by_account: HashMap<&str, Vec<DateTime<Utc>>> = HashMap::new();

        for txn in transactions {
            by_sender.entry(txn.sender_id.as_str()).or_default().push(Leg {
                timestamp: txn.timestamp,
                counterparty: txn.receiver_id.as_str(),
                amount: txn.amount,
            });
            by_receiver.entry(txn.receiver_id.as_str()).or_default().push(Leg {
                timestamp: txn.timestamp,
                counterparty: txn.sender_id.as_str(),
                amount: txn.amount,
            });
            by_account.entry(txn.sender_id.as_str()).or_default().push(txn.timestamp);
            by_account
                .entry(txn.receiver_id.as_str())
                .or_default()
                .push(txn.timestamp);
        }

        for legs in by_sender.values_mut() {
            legs.sort_by_key(|l| l.timestamp);
        }
        for legs in by_receiver.values_mut() {
            legs.sort_by_key(|l| l.timestamp);
        }
        for ts in by_account.values_mut() {
            ts.sort();
        }

        AccountIndex {
            by_sender,
            by_receiver,
            by_account,
        }
    }

    pub fn outgoing(&self, account_id: &str) -> &[Leg<'a>] {
        self.by_sender.get(account_id).map_or(&[], |v| v.as_slice())
    }

    pub fn incoming(&self, account_id: &str) -> &[Leg<'a>] {
        self.by_receiver.get(account_id).map_or(&[], |v| v.as_slice())
    }

    pub fn combined_timestamps(&self, account_id: &str) -> &[DateTime<Utc>] {
        self.by_account.get(account_id).map_or(&[], |v| v.as_slice())
    }

    pub fn senders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_sender.keys().copied()
    }

    pub fn receivers(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_receiver.keys().copied()
    }
}
