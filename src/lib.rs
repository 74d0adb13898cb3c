//! # launder-graph-forensics
//!
//! A forensic analyzer for money-laundering patterns in financial
//! transaction logs. Given a bounded table of transactions, builds a
//! directed weighted transaction graph and runs four independent detection
//! algorithms — cycle, smurfing, shell-chain and velocity — whose outputs
//! are fused into per-account continuous suspicion scores and Union-Find
//! merged fraud rings.
//!
//! ## Pipeline
//!
//! 1. [`graph::Graph::build`] folds the transaction table into a collapsed
//!    directed multigraph.
//! 2. The four detectors run independently over the same graph and
//!    transaction slice: [`cycle`], [`smurfing`], [`shell_chain`],
//!    [`velocity`].
//! 3. [`suppression::apply`] derives a per-account multiplier that
//!    discounts the smurfing category for payroll- and merchant-shaped
//!    activity.
//! 4. [`scoring::fuse`] combines the four category scores additively.
//! 5. [`ring_merger::merge`] groups suspicious accounts into named rings.
//! 6. [`output::build`] assembles the final sorted, structured result.
//!
//! The detection engine (this crate) takes a validated `&[Transaction]` and
//! never performs I/O itself; [`ingest::parse_csv`] is a convenience wrapper
//! for CSV input kept outside the hard core.

pub mod cycle;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod output;
pub mod patterns;
pub mod ring_merger;
pub mod scoring;
pub mod settings;
pub mod shell_chain;
pub mod smurfing;
pub mod stats;
pub mod suppression;
pub mod transaction;
pub mod tx_index;
pub mod velocity;

pub use error::ForensicError;
pub use output::{ForensicResult, ForensicSummary, SuspiciousAccount};
pub use patterns::Pattern;
pub use ring_merger::Ring;
pub use settings::Settings;
pub use transaction::Transaction;

use std::time::Instant;

use graph::Graph;
use transaction::AlgorithmResult;
use tx_index::AccountIndex;

/// Run the full detection pipeline over an already-validated transaction
/// slice. Returns [`ForensicError::InputContractViolation`] if any row
/// violates the input contract (self-loop or non-positive amount); every
/// other abnormal condition (enumeration caps, numeric degeneracies) is
/// handled internally per each detector's documented fallback.
pub fn run_pipeline(transactions: &[Transaction], settings: &Settings) -> Result<ForensicResult, ForensicError> {
    let start = Instant::now();

    for txn in transactions {
        txn.validate()?;
    }

    let graph = Graph::build(transactions);
    log::info!(
        "pipeline start: {} transactions, graph has {} nodes, {} edges",
        transactions.len(),
        graph.node_count(),
        graph.edge_count()
    );

    let index = AccountIndex::build(transactions);

    let cycle_result = cycle::detect(&graph, transactions, settings);
    log::info!(
        "cycle: {} accounts flagged, {} clusters",
        cycle_result.account_flags.len(),
        cycle_result.clusters.len()
    );

    let smurfing_result = smurfing::detect(&index, transactions, settings);
    log::info!(
        "smurfing: {} accounts flagged, {} clusters",
        smurfing_result.account_flags.len(),
        smurfing_result.clusters.len()
    );

    let shell_result = shell_chain::detect(&graph, transactions, settings);
    log::info!(
        "shell_chain: {} accounts flagged, {} clusters",
        shell_result.account_flags.len(),
        shell_result.clusters.len()
    );

    let velocity_result = velocity::detect(&index, settings);
    log::info!(
        "velocity: {} accounts flagged",
        velocity_result.account_flags.len()
    );

    let combined_flags = merge_flags(&[&cycle_result, &smurfing_result, &shell_result, &velocity_result]);
    let all_clusters: Vec<std::collections::HashSet<String>> = cycle_result
        .clusters
        .iter()
        .chain(shell_result.clusters.iter())
        .cloned()
        .collect();

    let suppression = suppression::apply(&combined_flags, &graph, &index, settings);
    let removed_count: usize = suppression.removed_display_flags.values().map(Vec::len).sum();
    log::info!("suppression: {removed_count} flags removed from display");

    let scores = scoring::fuse(
        &cycle_result.account_scores,
        &smurfing_result.account_scores,
        &shell_result.account_scores,
        &velocity_result.account_scores,
        &suppression,
    );
    let n_above_threshold = scores.values().filter(|&&s| s > settings.suspicious_score_threshold).count();
    log::info!(
        "scoring: {n_above_threshold} accounts above threshold ({})",
        settings.suspicious_score_threshold
    );

    let effective_flags = effective_flags(&combined_flags, &suppression.removed_display_flags);

    let (rings, ring_membership) = ring_merger::merge(&all_clusters, &scores, &effective_flags, settings);
    log::info!("rings: {} identified", rings.len());

    let elapsed = start.elapsed();
    let result = output::build(
        graph.node_count(),
        &scores,
        &effective_flags,
        &ring_membership,
        rings,
        settings,
        elapsed,
    );
    log::info!("pipeline complete in {:.3}s", elapsed.as_secs_f64());

    Ok(result)
}

fn merge_flags(results: &[&AlgorithmResult]) -> std::collections::HashMap<String, Vec<Pattern>> {
    let mut combined: std::collections::HashMap<String, Vec<Pattern>> = std::collections::HashMap::new();
    for result in results {
        for (account, patterns) in &result.account_flags {
            let entry = combined.entry(account.clone()).or_default();
            for &pattern in patterns {
                if !entry.contains(&pattern) {
                    entry.push(pattern);
                }
            }
        }
    }
    combined
}

fn effective_flags(
    combined: &std::collections::HashMap<String, Vec<Pattern>>,
    removed: &std::collections::HashMap<String, Vec<String>>,
) -> std::collections::HashMap<String, Vec<String>> {
    combined
        .iter()
        .map(|(account, patterns)| {
            let hidden = removed.get(account);
            let labels: Vec<String> = patterns
                .iter()
                .map(|p| p.as_str().into_owned())
                .filter(|label| hidden.map_or(true, |h| !h.contains(label)))
                .collect();
            (account.clone(), labels)
        })
        .collect()
}
