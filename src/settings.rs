//! Pipeline configuration — the closed set from spec §6, fixed at
//! construction and passed by value/reference into the pipeline (spec §9
//! "global mutable state" redesign: no settings singleton).
//!
//! Mirrors the teacher's `ValidatorConfig`/`FraudThresholds` pattern: a plain
//! struct, a `Default` impl carrying the documented defaults, and an
//! optional builder-style override.

/// All algorithm thresholds the engine reads. Every field here is named
/// exactly as spec §6 enumerates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // ── Cycle detection ─────────────────────────────────────────────────
    pub min_cycle_length: usize,
    pub max_cycle_length: usize,
    pub cycle_volume_threshold_pct: f64,

    // ── Smurfing ─────────────────────────────────────────────────────────
    pub smurfing_window_hours: i64,
    pub smurfing_min_degree: usize,

    // ── Shell chain ──────────────────────────────────────────────────────
    pub shell_max_total_transactions: u32,
    pub shell_chain_min_hops: usize,

    // ── Velocity ─────────────────────────────────────────────────────────
    pub burst_window_hours: i64,
    pub burst_min_transactions: usize,
    pub daily_velocity_window_hours: i64,
    pub daily_velocity_min_transactions: usize,
    pub velocity_spike_ratio: f64,
    pub velocity_spike_window_days: i64,
    pub dormancy_min_days: i64,
    pub dormancy_activity_window_hours: i64,
    pub dormancy_activity_threshold: usize,

    // ── Suppression ──────────────────────────────────────────────────────
    pub payroll_interval_cv_threshold: f64,
    pub payroll_amount_cv_threshold: f64,
    pub merchant_min_in_degree: u32,

    // ── Scoring / ring universe ──────────────────────────────────────────
    pub suspicious_score_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_cycle_length: 3,
            max_cycle_length: 5,
            cycle_volume_threshold_pct: 0.01,

            smurfing_window_hours: 72,
            smurfing_min_degree: 10,

            shell_max_total_transactions: 3,
            shell_chain_min_hops: 3,

            burst_window_hours: 1,
            burst_min_transactions: 5,
            daily_velocity_window_hours: 24,
            daily_velocity_min_transactions: 15,
            velocity_spike_ratio: 3.0,
            velocity_spike_window_days: 7,
            dormancy_min_days: 30,
            dormancy_activity_window_hours: 48,
            dormancy_activity_threshold: 5,

            payroll_interval_cv_threshold: 0.2,
            payroll_amount_cv_threshold: 0.15,
            merchant_min_in_degree: 50,

            suspicious_score_threshold: 12.0,
        }
    }
}
