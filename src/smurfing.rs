//! Smurfing detector (spec §4.3): sliding 72-hour fan-in / fan-out windows.
//!
//! Grounded in the teacher's `detect_structuring` threshold-window scan
//! (`fraud_patterns.rs`), generalized from a fixed reporting-threshold check
//! into the two-directional fan-in/fan-out window spec §4.3 describes.

use std::collections::HashSet;

use crate::patterns::Pattern;
use crate::settings::Settings;
use crate::stats::{mean, median, std_dev};
use crate::transaction::AlgorithmResult;
use crate::tx_index::{AccountIndex, Leg};

enum Direction {
    FanIn,
    FanOut,
}

pub fn detect(index: &AccountIndex, transactions: &[crate::transaction::Transaction], settings: &Settings) -> AlgorithmResult {
    let mut result = AlgorithmResult::new();
    let median_amount = median(&transactions.iter().map(|t| t.amount).collect::<Vec<_>>());

    let mut receivers: Vec<&str> = index.receivers().collect();
    receivers.sort_unstable();
    for account in receivers {
        scan_group(&mut result, account, index.incoming(account), Direction::FanIn, settings, median_amount);
    }

    let mut senders: Vec<&str> = index.senders().collect();
    senders.sort_unstable();
    for account in senders {
        scan_group(&mut result, account, index.outgoing(account), Direction::FanOut, settings, median_amount);
    }

    result
}

fn scan_group(
    result: &mut AlgorithmResult,
    account: &str,
    legs: &[Leg],
    direction: Direction,
    settings: &Settings,
    median_amount: f64,
) {
    if legs.len() < settings.smurfing_min_degree {
        return;
    }
    let window = chrono::Duration::hours(settings.smurfing_window_hours);

    for i in 0..legs.len() {
        let limit = legs[i].timestamp + window;
        let mut r = i;
        while r < legs.len() && legs[r].timestamp <= limit {
            r += 1;
        }

        let slice = &legs[i..r];
        let unique: HashSet<&str> = slice.iter().map(|l| l.counterparty).collect();
        if unique.len() < settings.smurfing_min_degree {
            continue;
        }

        let amounts: Vec<f64> = slice.iter().map(|l| l.amount).collect();
        let total_amount: f64 = amounts.iter().sum();
        let span = legs[r - 1].timestamp - legs[i].timestamp;
        let score = score_window(unique.len(), span, total_amount, &amounts, settings, median_amount);

        let pattern = match direction {
            Direction::FanIn => Pattern::SmurfingFanIn,
            Direction::FanOut => Pattern::SmurfingFanOut,
        };
        result.add_flag(account, pattern);
        result.raise_score(account, score);

        let mut cluster: HashSet<String> = unique.iter().map(|s| s.to_string()).collect();
        cluster.insert(account.to_string());
        result.clusters.push(cluster);

        // One triggering window is sufficient — move on to the next group.
        return;
    }
}

fn score_window(
    unique_count: usize,
    span: chrono::Duration,
    total_amount: f64,
    amounts: &[f64],
    settings: &Settings,
    median_amount: f64,
) -> f64 {
    let min_degree = settings.smurfing_min_degree;
    let f_degree = (1.0f64).min((unique_count as f64 - min_degree as f64) / (40 - min_degree).max(1) as f64);

    let max_window_ns = chrono::Duration::hours(settings.smurfing_window_hours)
        .num_nanoseconds()
        .unwrap_or(1);
    let actual_ns = span.num_nanoseconds().unwrap_or(0);
    let f_speed = 1.0 - (1.0f64).min(actual_ns as f64 / max_window_ns as f64);

    let f_volume = if median_amount > 0.0 {
        (1.0f64).min((total_amount / median_amount).max(1.0).log10() / 4.0)
    } else {
        0.0
    };

    let f_uniformity = if amounts.len() < 2 {
        0.0
    } else {
        let m = mean(amounts);
        if m == 0.0 {
            0.0
        } else {
            let cv = std_dev(amounts) / m;
            (0.0f64).max(1.0 - cv / 0.5)
        }
    };

    let score = 25.0 * (0.35 * f_degree + 0.30 * f_speed + 0.20 * f_volume + 0.15 * f_uniformity);
    (score * 100.0).round() / 100.0
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
    fn flags_fan_in_within_window() {
        // 10 unique senders all paying "C" within an 11-hour span, clearing
        // the default smurfing_min_degree = 10 inside the 72h window.
        let rows: Vec<Transaction> = (0..10)
            .map(|i| txn(&format!("T{i}"), &format!("S{i}"), "C", 100.0, i))
            .collect();
        let index = AccountIndex::build(&rows);
        let settings = Settings::default();
        let result = detect(&index, &rows, &settings);
        assert!(result.account_flags["C"].contains(&Pattern::SmurfingFanIn));
        assert_eq!(result.clusters.len(), 1);
    }

    #[test]
    fn does_not_flag_fan_in_spread_beyond_window() {
        // 10 unique senders but spread over 90 hours — outside the 72h window.
        let rows: Vec<Transaction> = (0..10)
            .map(|i| txn(&format!("T{i}"), &format!("S{i}"), "C", 100.0, i * 10))
            .collect();
        let index = AccountIndex::build(&rows);
        let settings = Settings::default();
        let result = detect(&index, &rows, &settings);
        assert!(!result.account_flags.contains_key("C"));
    }

    #[test]
    fn below_min_degree_is_unflagged() {
        let rows: Vec<Transaction> = (0..5)
            .map(|i| txn(&format!("T{i}"), &format!("S{i}"), "C", 100.0, i))
            .collect();
        let index = AccountIndex::build(&rows);
        let settings = Settings::default();
        let result = detect(&index, &rows, &settings);
        assert!(!result.account_flags.contains_key("C"));
    }
}
