//! Shell-chain detector (spec §4.4): bounded BFS over the graph looking for
//! obfuscation paths `non-shell → shell → … → shell → non-shell`.
//!
//! Grounded in the teacher's `detect_layering` breadth-first walk in
//! `network_analysis.rs`, generalized from a fixed 3-hop check into
//! configurable minimum hop count and shell classification.

use std::collections::{HashSet, VecDeque};

use crate::error::CapWarning;
use crate::graph::Graph;
use crate::patterns::Pattern;
use crate::settings::Settings;
use crate::stats::median;
use crate::transaction::{AlgorithmResult, Transaction};
use crate::velocity::timestamp_span_hours;

const MAX_DEPTH: usize = 10;
const MAX_CHAINS: usize = 10_000;

fn is_shell(graph: &Graph, node: usize, settings: &Settings) -> bool {
    graph.total_transactions(node) <= settings.shell_max_total_transactions
}

pub fn detect(graph: &Graph, transactions: &[Transaction], settings: &Settings) -> AlgorithmResult {
    let mut result = AlgorithmResult::new();
    let median_amount = median(&transactions.iter().map(|t| t.amount).collect::<Vec<_>>());
    let mut seen_paths: HashSet<Vec<usize>> = HashSet::new();
    let mut total_chains = 0usize;

    let mut sources: Vec<usize> = graph.indices().collect();
    sources.sort_unstable();

    'sources: for source in sources {
        if is_shell(graph, source, settings) {
            continue;
        }

        let mut queue: VecDeque<(usize, Vec<usize>, HashSet<usize>)> = VecDeque::new();
        queue.push_back((source, vec![source], HashSet::from([source])));

        while let Some((current, path, visited)) = queue.pop_front() {
            for &next in graph.successors(current) {
                if visited.contains(&next) {
                    continue;
                }
                if path.len() - 1 >= MAX_DEPTH {
                    continue;
                }

                let mut extended = path.clone();
                extended.push(next);

                if is_shell(graph, next, settings) {
                    let mut next_visited = visited.clone();
                    next_visited.insert(next);
                    queue.push_back((next, extended, next_visited));
                    continue;
                }

                // Non-shell destination: never extend past it. Valid only
                // if the chain has enough hops and every intermediate node
                // is a shell.
                let hops = extended.len() - 1;
                if hops >= settings.shell_chain_min_hops {
                    total_chains += 1;
                    if total_chains > MAX_CHAINS {
                        CapWarning::new("shell_chain", "global chain enumeration", MAX_CHAINS).log();
                        break 'sources;
                    }
                    record_chain(graph, &extended, settings, median_amount, &mut seen_paths, &mut result);
                }
            }
        }
    }

    result
}

fn record_chain(
    graph: &Graph,
    path: &[usize],
    settings: &Settings,
    median_amount: f64,
    seen_paths: &mut HashSet<Vec<usize>>,
    result: &mut AlgorithmResult,
) {
    if !seen_paths.insert(path.to_vec()) {
        return;
    }

    let hops = path.len() - 1;
    let mut chain_volume = 0.0;
    let mut timestamps = Vec::with_capacity(hops * 2);
    for pair in path.windows(2) {
        let Some(edge) = graph.edge(pair[0], pair[1]) else {
            return;
        };
        chain_volume += edge.weight;
        timestamps.push(edge.ts_min);
        timestamps.push(edge.ts_max);
    }

    let intermediaries = &path[1..path.len() - 1];
    let f_depth = (1.0f64).min(
        (hops - settings.shell_chain_min_hops) as f64
            / (10usize.saturating_sub(settings.shell_chain_min_hops)).max(1) as f64,
    );
    let f_volume = if median_amount > 0.0 {
        (1.0f64).min((chain_volume / median_amount).max(1.0).log10() / 4.0)
    } else {
        0.0
    };
    let f_isolation = if intermediaries.is_empty() {
        1.0
    } else {
        let avg_total = intermediaries
            .iter()
            .map(|&n| graph.total_transactions(n) as f64)
            .sum::<f64>()
            / intermediaries.len() as f64;
        (0.0f64).max(
            1.0 - (avg_total - 1.0)
                / (settings.shell_max_total_transactions as f64 - 1.0).max(1.0),
        )
    };
    let span_hours = timestamp_span_hours(&timestamps);
    let f_velocity = 1.0 - (span_hours / 168.0).min(1.0);

    let score = (20.0
        * (0.40 * f_depth + 0.30 * f_volume + 0.20 * f_isolation + 0.10 * f_velocity)
        * 100.0)
        .round()
        / 100.0;

    let first = graph.account_id(path[0]);
    let last = graph.account_id(path[path.len() - 1]);
    result.add_flag(first, Pattern::ShellSource);
    result.add_flag(last, Pattern::ShellSource);
    result.raise_score(first, score);
    result.raise_score(last, score);

    let mut member_set = HashSet::new();
    member_set.insert(first.to_string());
    member_set.insert(last.to_string());
    for &idx in intermediaries {
        let account_id = graph.account_id(idx);
        member_set.insert(account_id.to_string());
        result.add_flag(account_id, Pattern::ShellIntermediary);
        result.raise_score(account_id, score);
    }
    result.clusters.push(member_set);
}
