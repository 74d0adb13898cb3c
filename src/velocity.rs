//! Velocity detector (spec §4.5): four temporal anomaly sub-patterns per
//! account, fused into a single velocity category score. Emits no clusters.
//!
//! Grounded in the teacher's `detect_rapid_movement`/timestamp-gap scans in
//! `network_analysis.rs`, generalized from a single "rapid in-and-out" check
//! into the four independent sub-patterns spec §4.5 names.

use chrono::{DateTime, Utc};

use crate::patterns::Pattern;
use crate::settings::Settings;
use crate::transaction::AlgorithmResult;
use crate::tx_index::AccountIndex;

/// Timespan in hours between the earliest and latest of a set of
/// timestamps. `0.5` (spec's documented neutral fallback) when fewer than
/// two distinct data points are supplied.
pub fn timestamp_span_hours(timestamps: &[DateTime<Utc>]) -> f64 {
    if timestamps.len() < 2 {
        return 0.5;
    }
    let min = timestamps.iter().min().unwrap();
    let max = timestamps.iter().max().unwrap();
    (*max - *min).num_seconds() as f64 / 3600.0
}

fn f_count(count: usize, min_txns: usize) -> f64 {
    (1.0f64).min((count as f64 - min_txns as f64) / (min_txns.max(1) as f64))
}

fn f_speed(span_ns: i64, window_ns: i64) -> f64 {
    1.0 - (1.0f64).min(span_ns as f64 / window_ns.max(1) as f64)
}

/// Earliest-anchor scan shared by `burst_activity` and `high_velocity`:
/// find the first row `i` such that the window `[ts[i], ts[i]+window]`
/// contains at least `min_count` sends, and return `(count, span)` for
/// that window.
fn earliest_qualifying_window(
    timestamps: &[DateTime<Utc>],
    window_hours: i64,
    min_count: usize,
) -> Option<(usize, chrono::Duration)> {
    let window = chrono::Duration::hours(window_hours);
    for i in 0..timestamps.len() {
        let limit = timestamps[i] + window;
        let mut j = i;
        while j < timestamps.len() && timestamps[j] <= limit {
            j += 1;
        }
        let count = j - i;
        if count >= min_count {
            return Some((count, timestamps[j - 1] - timestamps[i]));
        }
    }
    None
}

pub fn detect(index: &AccountIndex, settings: &Settings) -> AlgorithmResult {
    let mut result = AlgorithmResult::new();

    let mut senders: Vec<&str> = index.senders().collect();
    senders.sort_unstable();
    for account in senders {
        let sent: Vec<DateTime<Utc>> = index.outgoing(account).iter().map(|l| l.timestamp).collect();
        burst_activity(&mut result, account, &sent, settings);
        high_velocity(&mut result, account, &sent, settings);
        velocity_spike(&mut result, account, &sent, settings);
    }

    let mut accounts: Vec<&str> = index.senders().chain(index.receivers()).collect();
    accounts.sort_unstable();
    accounts.dedup();
    for account in accounts {
        let combined = index.combined_timestamps(account);
        dormancy_break(&mut result, account, combined, settings);
    }

    result
}

fn burst_activity(result: &mut AlgorithmResult, account: &str, sent: &[DateTime<Utc>], settings: &Settings) {
    let Some((count, span)) =
        earliest_qualifying_window(sent, settings.burst_window_hours, settings.burst_min_transactions)
    else {
        return;
    };
    let window_ns = chrono::Duration::hours(settings.burst_window_hours).num_nanoseconds().unwrap_or(1);
    let score = 15.0
        * (0.60 * f_count(count, settings.burst_min_transactions)
            + 0.40 * f_speed(span.num_nanoseconds().unwrap_or(0), window_ns));
    result.add_flag(account, Pattern::BurstActivity);
    result.raise_score(account, (score * 100.0).round() / 100.0);
}

fn high_velocity(result: &mut AlgorithmResult, account: &str, sent: &[DateTime<Utc>], settings: &Settings) {
    let Some((count, span)) = earliest_qualifying_window(
        sent,
        settings.daily_velocity_window_hours,
        settings.daily_velocity_min_transactions,
    ) else {
        return;
    };
    let window_ns = chrono::Duration::hours(settings.daily_velocity_window_hours)
        .num_nanoseconds()
        .unwrap_or(1);
    let score = 15.0
        * (0.60 * f_count(count, settings.daily_velocity_min_transactions)
            + 0.40 * f_speed(span.num_nanoseconds().unwrap_or(0), window_ns));
    result.add_flag(account, Pattern::HighVelocity);
    result.raise_score(account, (score * 100.0).round() / 100.0);
}

fn velocity_spike(result: &mut AlgorithmResult, account: &str, sent: &[DateTime<Utc>], settings: &Settings) {
    let Some(&latest) = sent.last() else { return };
    let window = chrono::Duration::days(settings.velocity_spike_window_days);
    let current_count = sent.iter().filter(|&&ts| ts > latest - window && ts <= latest).count();
    let previous_count = sent
        .iter()
        .filter(|&&ts| ts > latest - window * 2 && ts <= latest - window)
        .count();
    if previous_count == 0 {
        return;
    }
    let ratio = current_count as f64 / previous_count as f64;
    if ratio < settings.velocity_spike_ratio {
        return;
    }
    let score = 15.0 * (1.0f64).min((ratio - settings.velocity_spike_ratio) / settings.velocity_spike_ratio);
    result.add_flag(account, Pattern::VelocitySpike);
    result.raise_score(account, (score * 100.0).round() / 100.0);
}

fn dormancy_break(result: &mut AlgorithmResult, account: &str, combined: &[DateTime<Utc>], settings: &Settings) {
    if combined.len() < 2 {
        return;
    }
    let mut largest_gap = chrono::Duration::zero();
    let mut resume_ts = combined[0];
    for pair in combined.windows(2) {
        let gap = pair[1] - pair[0];
        if gap > largest_gap {
            largest_gap = gap;
            resume_ts = pair[1];
        }
    }
    let gap_days = largest_gap.num_seconds() as f64 / 86_400.0;
    if gap_days < settings.dormancy_min_days as f64 {
        return;
    }
    let window = chrono::Duration::hours(settings.dormancy_activity_window_hours);
    let resume_window_end = resume_ts + window;
    let k = combined
        .iter()
        .filter(|&&ts| ts >= resume_ts && ts <= resume_window_end)
        .count();
    if k < settings.dormancy_activity_threshold {
        return;
    }
    let f_dormancy = (1.0f64).min(gap_days / 90.0);
    let f_burst = (1.0f64).min(
        (k as f64 - settings.dormancy_activity_threshold as f64)
            / settings.dormancy_activity_threshold.max(1) as f64,
    );
    let score = 15.0 * (0.50 * f_dormancy + 0.50 * f_burst);
    result.add_flag(account, Pattern::DormancyBreak);
    result.raise_score(account, (score * 100.0).round() / 100.0);
}
