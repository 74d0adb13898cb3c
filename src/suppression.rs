//! False-positive suppression (spec §4.6): payroll and merchant heuristics
//! that discount the smurfing category score for shapes that look like
//! ordinary business activity rather than structuring.
//!
//! Grounded in the teacher's `is_likely_payroll`/`is_likely_merchant`
//! heuristics in `fraud_patterns.rs`, generalized from a binary
//! suppress/don't-suppress decision into the graduated multiplier table
//! spec §4.6 defines.

use std::collections::HashMap;

use crate::graph::Graph;
use crate::patterns::Pattern;
use crate::settings::Settings;
use crate::stats::{mean, std_dev};
use crate::tx_index::AccountIndex;

/// `removed_display_flags` (labels hidden from the effective flag set) and
/// `multipliers` (applied to the smurfing category score in scoring).
pub struct SuppressionResult {
    pub removed_display_flags: HashMap<String, Vec<String>>,
    pub multipliers: HashMap<String, f64>,
}

pub fn apply(
    combined_flags: &HashMap<String, Vec<Pattern>>,
    graph: &Graph,
    index: &AccountIndex,
    settings: &Settings,
) -> SuppressionResult {
    let mut removed_display_flags: HashMap<String, Vec<String>> = HashMap::new();
    let mut multipliers: HashMap<String, f64> = HashMap::new();

    for (account, flags) in combined_flags {
        let has_fan_out = flags.contains(&Pattern::SmurfingFanOut);
        let has_fan_in = flags.contains(&Pattern::SmurfingFanIn);
        if !has_fan_out && !has_fan_in {
            continue;
        }

        let mut applicable = Vec::new();
        if has_fan_out {
            applicable.push(payroll_multiplier(index, account, settings));
        }
        if has_fan_in {
            applicable.push(merchant_multiplier(graph, account, settings));
        }

        let multiplier = applicable.into_iter().fold(1.0f64, f64::min);
        multipliers.insert(account.clone(), multiplier);

        if multiplier <= 0.2 {
            let removed = removed_display_flags.entry(account.clone()).or_default();
            if has_fan_out {
                removed.push(Pattern::SmurfingFanOut.as_str().into_owned());
            }
            if has_fan_in {
                removed.push(Pattern::SmurfingFanIn.as_str().into_owned());
            }
        }
    }

    SuppressionResult {
        removed_display_flags,
        multipliers,
    }
}

/// Rule 1 — payroll: regular interval, regular amount outgoing transfers.
fn payroll_multiplier(index: &AccountIndex, account: &str, settings: &Settings) -> f64 {
    let legs = index.outgoing(account);
    if legs.len() < 2 {
        return 1.0;
    }

    let amounts: Vec<f64> = legs.iter().map(|l| l.amount).collect();
    let amount_mean = mean(&amounts);
    if amount_mean == 0.0 {
        return 1.0;
    }
    let amount_cv = std_dev(&amounts) / amount_mean;

    let intervals: Vec<f64> = legs
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64)
        .collect();
    let interval_mean = mean(&intervals);
    if interval_mean == 0.0 {
        return 1.0;
    }
    let interval_cv = std_dev(&intervals) / interval_mean;

    let a = settings.payroll_amount_cv_threshold;
    let i = settings.payroll_interval_cv_threshold;

    if amount_cv < 0.5 * a && interval_cv < 0.5 * i {
        0.1
    } else if amount_cv < a && interval_cv < i {
        0.2
    } else if amount_cv < a || interval_cv < i {
        0.5
    } else {
        1.0
    }
}

/// Rule 2 — merchant: heavy one-directional fan-in, little or no fan-out.
fn merchant_multiplier(graph: &Graph, account: &str, settings: &Settings) -> f64 {
    let Some(idx) = graph.index_of(account) else {
        return 1.0;
    };
    let in_deg = graph.in_degree(idx) as f64;
    let out_deg = graph.out_degree(idx);
    let m = settings.merchant_min_in_degree as f64;

    if in_deg >= 2.0 * m && out_deg == 0 {
        0.1
    } else if in_deg >= m && out_deg == 0 {
        0.2
    } else if in_deg >= 0.6 * m && out_deg <= 3 {
        0.5
    } else if in_deg >= 0.3 * m {
        0.8
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;
    use chrono::Utc;

    fn txn(id: &str, from: &str, to: &str, amount: f64, hour: i64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            sender_id: from.to_string(),
            receiver_id: to.to_string(),
            amount,
            timestamp: Utc::now() + chrono::Duration::hours(hour),
        }
    }

    #[test]
    fn regular_payroll_pattern_gets_lowest_multiplier() {
        // Fixed amount, fixed 720h (30-day) interval: both CVs are zero.
        let rows: Vec<Transaction> = (0..5)
            .map(|i| txn(&format!("T{i}"), "P", &format!("E{i}"), 1000.0, i * 720))
            .collect();
        let index = AccountIndex::build(&rows);
        let graph = Graph::build(&rows);
        let mut flags = HashMap::new();
        flags.insert("P".to_string(), vec![Pattern::SmurfingFanOut]);
        let settings = Settings::default();
        let result = apply(&flags, &graph, &index, &settings);
        assert_eq!(result.multipliers["P"], 0.1);
        assert!(result.removed_display_flags.contains_key("P"));
    }

    #[test]
    fn pure_merchant_gets_lowest_multiplier() {
        let rows: Vec<Transaction> = (0..120)
            .map(|i| txn(&format!("T{i}"), &format!("C{i}"), "M", 50.0, i))
            .collect();
        let index = AccountIndex::build(&rows);
        let graph = Graph::build(&rows);
        let mut flags = HashMap::new();
        flags.insert("M".to_string(), vec![Pattern::SmurfingFanIn]);
        let settings = Settings::default();
        let result = apply(&flags, &graph, &index, &settings);
        assert_eq!(result.multipliers["M"], 0.1);
    }

    #[test]
    fn irregular_activity_is_not_suppressed() {
        let rows = vec![
            txn("T1", "P", "E1", 10.0, 0),
            txn("T2", "P", "E2", 9999.0, 500),
        ];
        let index = AccountIndex::build(&rows);
        let graph = Graph::build(&rows);
        let mut flags = HashMap::new();
        flags.insert("P".to_string(), vec![Pattern::SmurfingFanOut]);
        let settings = Settings::default();
        let result = apply(&flags, &graph, &index, &settings);
        assert_eq!(result.multipliers["P"], 1.0);
        assert!(!result.removed_display_flags.contains_key("P"));
    }
}
