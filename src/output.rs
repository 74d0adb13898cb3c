//! Output builder (spec §4.9): deterministic assembly of the final
//! structured result from per-account scores, effective flags and rings.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ring_merger::Ring;
use crate::settings::Settings;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuspiciousAccount {
    pub account_id: String,
    pub suspicion_score: f64,
    pub patterns: Vec<String>,
    pub ring_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForensicSummary {
    pub accounts_analyzed: usize,
    pub suspicious_accounts: usize,
    pub rings_found: usize,
    pub pipeline_duration_ms: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForensicResult {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub rings: Vec<Ring>,
    pub summary: ForensicSummary,
}

#[allow(clippy::too_many_arguments)]
pub fn build(
    accounts_analyzed: usize,
    scores: &HashMap<String, f64>,
    effective_flags: &HashMap<String, Vec<String>>,
    ring_membership: &HashMap<String, String>,
    rings: Vec<Ring>,
    settings: &Settings,
    elapsed: Duration,
) -> ForensicResult {
    let mut suspicious: Vec<SuspiciousAccount> = scores
        .iter()
        .filter(|(_, &score)| score > settings.suspicious_score_threshold)
        .map(|(account, &score)| {
            let mut patterns = effective_flags.get(account).cloned().unwrap_or_default();
            patterns.sort();
            patterns.dedup();
            SuspiciousAccount {
                account_id: account.clone(),
                suspicion_score: score,
                patterns,
                ring_id: ring_membership.get(account).cloned().unwrap_or_else(|| "NONE".to_string()),
            }
        })
        .collect();

    suspicious.sort_by(|a, b| {
        b.suspicion_score
            .partial_cmp(&a.suspicion_score)
            .unwrap()
            .then_with(|| a.account_id.cmp(&b.account_id))
    });

    let mut sorted_rings = rings;
    sorted_rings.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap()
            .then_with(|| a.ring_id.cmp(&b.ring_id))
    });

    let summary = ForensicSummary {
        accounts_analyzed,
        suspicious_accounts: suspicious.len(),
        rings_found: sorted_rings.len(),
        pipeline_duration_ms: elapsed.as_millis(),
    };

    ForensicResult {
        suspicious_accounts: suspicious,
        rings: sorted_rings,
        summary,
    }
}
