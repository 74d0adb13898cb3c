//! Cycle detector (spec §4.2): SCC-bounded enumeration of simple monetary
//! loops of length 3–5, scored and deduplicated by member set.
//!
//! Grounded in the teacher's `detect_circular_flows` (`network_analysis.rs`),
//! which walked depth-bounded paths back to an origin account; generalized
//! here to operate over the full account universe via SCC partitioning
//! (spec §9 redesign) instead of per-origin DFS from every node.

use std::collections::{HashMap, HashSet};

use crate::error::CapWarning;
use crate::graph::Graph;
use crate::patterns::Pattern;
use crate::settings::Settings;
use crate::stats::median;
use crate::transaction::{AlgorithmResult, Transaction};
use crate::velocity::timestamp_span_hours;

const MAX_SCC_SIZE: usize = 50;
const MAX_CYCLES_PER_SCC: usize = 500;

/// Run the cycle detector over the whole graph.
pub fn detect(graph: &Graph, transactions: &[Transaction], settings: &Settings) -> AlgorithmResult {
    let mut result = AlgorithmResult::new();
    let median_amount = median(&transactions.iter().map(|t| t.amount).collect::<Vec<_>>());

    let sccs = graph.strongly_connected_components();
    let mut seen_cycles: HashSet<Vec<usize>> = HashSet::new();

    for scc in sccs {
        if scc.len() < settings.min_cycle_length {
            continue;
        }
        if scc.len() > MAX_SCC_SIZE {
            CapWarning::new("cycle", format!("SCC of size {}", scc.len()), MAX_SCC_SIZE).log();
            continue;
        }

        let members: HashSet<usize> = scc.iter().copied().collect();
        let mut ordered: Vec<usize> = scc.clone();
        ordered.sort_unstable();

        let mut considered = 0usize;
        'scc: for (pos, &start) in ordered.iter().enumerate() {
            // Canonical reduction: only explore nodes >= start within this
            // SCC, so every simple cycle is discovered exactly once, rooted
            // at its smallest-index member.
            let allowed: HashSet<usize> = ordered[pos..].iter().copied().collect();

            let mut path: Vec<usize> = vec![start];
            let mut on_path: HashSet<usize> = HashSet::from([start]);

            if !enumerate_from(
                graph,
                start,
                start,
                &allowed,
                &members,
                &mut path,
                &mut on_path,
                settings.max_cycle_length,
                settings.min_cycle_length,
                &mut considered,
                MAX_CYCLES_PER_SCC,
                &mut seen_cycles,
                transactions,
                settings,
                median_amount,
                &mut result,
            ) {
                CapWarning::new("cycle", format!("SCC rooted at node {start}"), MAX_CYCLES_PER_SCC)
                    .log();
                break 'scc;
            }
        }
    }

    result
}

/// DFS over the induced subgraph restricted to `allowed`, closing a cycle
/// whenever we return to `start`. Returns `false` once the per-SCC
/// enumeration cap has been hit, signalling the caller to stop.
#[allow(clippy::too_many_arguments)]
fn enumerate_from(
    graph: &Graph,
    start: usize,
    current: usize,
    allowed: &HashSet<usize>,
    scc_members: &HashSet<usize>,
    path: &mut Vec<usize>,
    on_path: &mut HashSet<usize>,
    max_len: usize,
    min_len: usize,
    considered: &mut usize,
    cap: usize,
    seen_cycles: &mut HashSet<Vec<usize>>,
    transactions: &[Transaction],
    settings: &Settings,
    median_amount: f64,
    result: &mut AlgorithmResult,
) -> bool {
    for &next in graph.successors(current) {
        if !allowed.contains(&next) || !scc_members.contains(&next) {
            continue;
        }
        if next == start {
            if path.len() >= min_len
                && record_cycle(graph, path, transactions, settings, median_amount, seen_cycles, result)
            {
                *considered += 1;
                if *considered > cap {
                    return false;
                }
            }
            continue;
        }
        if path.len() >= max_len || on_path.contains(&next) {
            continue;
        }
        path.push(next);
        on_path.insert(next);
        let keep_going = enumerate_from(
            graph,
            start,
            next,
            allowed,
            scc_members,
            path,
            on_path,
            max_len,
            min_len,
            considered,
            cap,
            seen_cycles,
            transactions,
            settings,
            median_amount,
            result,
        );
        on_path.remove(&next);
        path.pop();
        if !keep_going {
            return false;
        }
    }
    true
}

/// Dedup, filter and score one closing path. Returns whether it was newly
/// recorded (passed the member-set dedup and the volume threshold) — only
/// an accepted cycle counts against `MAX_CYCLES_PER_SCC` (spec §4.2).
#[allow(clippy::too_many_arguments)]
fn record_cycle(
    graph: &Graph,
    path: &[usize],
    transactions: &[Transaction],
    settings: &Settings,
    median_amount: f64,
    seen_cycles: &mut HashSet<Vec<usize>>,
    result: &mut AlgorithmResult,
) -> bool {
    let mut key: Vec<usize> = path.to_vec();
    key.sort_unstable();
    if !seen_cycles.insert(key) {
        return false;
    }

    let len = path.len();
    let mut volume = 0.0;
    let mut timestamps = Vec::with_capacity(len * 2);
    for i in 0..len {
        let u = path[i];
        let v = path[(i + 1) % len];
        let Some(edge) = graph.edge(u, v) else {
            // Edge policy (spec §4.2): should not happen on a simple-cycle
            // walk of the induced subgraph, but drop silently if it does.
            return false;
        };
        volume += edge.weight;
        timestamps.push(edge.ts_min);
        timestamps.push(edge.ts_max);
    }

    let threshold = settings.cycle_volume_threshold_pct * median_amount * len as f64;
    if volume < threshold {
        return false;
    }

    let f_length = if settings.max_cycle_length > settings.min_cycle_length {
        (settings.max_cycle_length - len) as f64
            / (settings.max_cycle_length - settings.min_cycle_length) as f64
    } else {
        1.0
    };
    let f_volume = if median_amount > 0.0 {
        (1.0f64).min((volume / median_amount).max(1.0).log10() / 3.0)
    } else {
        0.0
    };
    let span_hours = timestamp_span_hours(&timestamps);
    let f_velocity = 1.0 - (span_hours / 168.0).min(1.0);

    let score = (40.0 * (0.40 * f_length + 0.35 * f_volume + 0.25 * f_velocity) * 100.0).round()
        / 100.0;

    let mut member_set = HashSet::new();
    for &idx in path {
        let account_id = graph.account_id(idx);
        member_set.insert(account_id.to_string());
        result.add_flag(account_id, Pattern::CycleLength(len as u8));
        result.raise_score(account_id, score);
    }
    result.clusters.push(member_set);
    let _ = transactions;
    true
}
