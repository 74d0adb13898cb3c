//! The transaction graph (spec §4.1, §9).
//!
//! A struct-of-arrays directed multigraph collapsed per `(sender, receiver)`
//! pair, replacing the "implicit graph with attributes" the original design
//! used: node table, edge table keyed by index pair, and CSR-like adjacency.
//! Generalizes the teacher's `TransactionGraph` (`network_analysis.rs`),
//! which keeps the same node/edge attributes but over `HashMap<String, _>`
//! rather than indices.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::transaction::Transaction;

/// Aggregate attributes for one collapsed `(sender, receiver)` edge.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub weight: f64,
    pub count: u32,
    pub ts_min: DateTime<Utc>,
    pub ts_max: DateTime<Utc>,
}

/// Directed multigraph with node and edge attributes, built once per
/// request and never mutated afterward (spec §4.1 contract).
#[derive(Debug, Clone)]
pub struct Graph {
    index_of: HashMap<String, usize>,
    accounts: Vec<String>,
    out_degree: Vec<u32>,
    in_degree: Vec<u32>,
    /// CSR-like per-node successor list, deduplicated.
    successors: Vec<Vec<usize>>,
    edges: HashMap<(usize, usize), EdgeData>,
}

impl Graph {
    /// Fold a transaction slice into the collapsed graph. Insertion order of
    /// nodes/edges is not observable — only the aggregate attributes matter.
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut index_of: HashMap<String, usize> = HashMap::new();
        let mut accounts: Vec<String> = Vec::new();
        let mut out_degree: Vec<u32> = Vec::new();
        let mut in_degree: Vec<u32> = Vec::new();

        fn index_for(
            accounts: &mut Vec<String>,
            out_degree: &mut Vec<u32>,
            in_degree: &mut Vec<u32>,
            index_of: &mut HashMap<String, usize>,
            id: &str,
        ) -> usize {
            *index_of.entry(id.to_string()).or_insert_with(|| {
                accounts.push(id.to_string());
                out_degree.push(0);
                in_degree.push(0);
                accounts.len() - 1
            })
        }

        // First pass: assign indices and tally per-account degree counts.
        for txn in transactions {
            let u = index_for(
                &mut accounts,
                &mut out_degree,
                &mut in_degree,
                &mut index_of,
                &txn.sender_id,
            );
            out_degree[u] += 1;
            let v = index_for(
                &mut accounts,
                &mut out_degree,
                &mut in_degree,
                &mut index_of,
                &txn.receiver_id,
            );
            in_degree[v] += 1;
        }

        // Second pass: collapse edges, aggregating weight/count/timestamp range.
        let mut edges: HashMap<(usize, usize), EdgeData> = HashMap::new();
        for txn in transactions {
            let u = index_of[&txn.sender_id];
            let v = index_of[&txn.receiver_id];
            edges
                .entry((u, v))
                .and_modify(|e| {
                    e.weight += txn.amount;
                    e.count += 1;
                    if txn.timestamp < e.ts_min {
                        e.ts_min = txn.timestamp;
                    }
                    if txn.timestamp > e.ts_max {
                        e.ts_max = txn.timestamp;
                    }
                })
                .or_insert(EdgeData {
                    weight: txn.amount,
                    count: 1,
                    ts_min: txn.timestamp,
                    ts_max: txn.timestamp,
                });
        }

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); accounts.len()];
        for &(u, v) in edges.keys() {
            successors[u].push(v);
        }

        Graph {
            index_of,
            accounts,
            out_degree,
            in_degree,
            successors,
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn index_of(&self, account_id: &str) -> Option<usize> {
        self.index_of.get(account_id).copied()
    }

    pub fn account_id(&self, index: usize) -> &str {
        &self.accounts[index]
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> {
        0..self.accounts.len()
    }

    pub fn out_degree(&self, index: usize) -> u32 {
        self.out_degree[index]
    }

    pub fn in_degree(&self, index: usize) -> u32 {
        self.in_degree[index]
    }

    pub fn total_transactions(&self, index: usize) -> u32 {
        self.out_degree[index] + self.in_degree[index]
    }

    pub fn successors(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    pub fn edge(&self, u: usize, v: usize) -> Option<&EdgeData> {
        self.edges.get(&(u, v))
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.edges.contains_key(&(u, v))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Strongly connected components, via an iterative Tarjan's algorithm
    /// (recursive would risk stack overflow on a long successor chain).
    /// Order of components and of nodes within a component is unspecified;
    /// callers that need determinism sort afterward.
    pub fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut next_index = 0usize;
        let mut indices: Vec<Option<usize>> = vec![None; n];
        let mut lowlink: Vec<usize> = vec![0; n];
        let mut on_stack: Vec<bool> = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();
        let mut sccs: Vec<Vec<usize>> = Vec::new();

        for start in 0..n {
            if indices[start].is_some() {
                continue;
            }

            // Explicit work stack of (node, next successor position) to
            // avoid recursion depth bounded only by input size.
            let mut work: Vec<(usize, usize)> = vec![(start, 0)];
            indices[start] = Some(next_index);
            lowlink[start] = next_index;
            next_index += 1;
            stack.push(start);
            on_stack[start] = true;

            while let Some(&mut (v, ref mut pos)) = work.last_mut() {
                let succs = self.successors(v);
                if *pos < succs.len() {
                    let w = succs[*pos];
                    *pos += 1;
                    match indices[w] {
                        None => {
                            indices[w] = Some(next_index);
                            lowlink[w] = next_index;
                            next_index += 1;
                            stack.push(w);
                            on_stack[w] = true;
                            work.push((w, 0));
                        }
                        Some(w_index) if on_stack[w] => {
                            lowlink[v] = lowlink[v].min(w_index);
                        }
                        _ => {}
                    }
                } else {
                    work.pop();
                    let v_low = lowlink[v];
                    if let Some(&(parent, _)) = work.last() {
                        lowlink[parent] = lowlink[parent].min(v_low);
                    }
                    if Some(v_low) == indices[v] {
                        let mut scc = Vec::new();
                        loop {
                            let w = stack.pop().expect("SCC stack underflow");
                            on_stack[w] = false;
                            scc.push(w);
                            if w == v {
                                break;
                            }
                        }
                        sccs.push(scc);
                    }
                }
            }
        }

        sccs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn collapses_multi_edges() {
        let rows = vec![
            txn("T1", "A", "B", 100.0, 0),
            txn("T2", "A", "B", 50.0, 1),
        ];
        let g = Graph::build(&rows);
        let a = g.index_of("A").unwrap();
        let b = g.index_of("B").unwrap();
        let edge = g.edge(a, b).unwrap();
        assert_eq!(edge.count, 2);
        assert_eq!(edge.weight, 150.0);
    }

    #[test]
    fn degree_counts_match_total() {
        let rows = vec![
            txn("T1", "A", "B", 100.0, 0),
            txn("T2", "B", "C", 50.0, 1),
            txn("T3", "C", "A", 25.0, 2),
        ];
        let g = Graph::build(&rows);
        for idx in g.indices() {
            assert_eq!(
                g.total_transactions(idx),
                g.out_degree(idx) + g.in_degree(idx)
            );
        }
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn three_cycle_is_one_scc() {
        let rows = vec![
            txn("T1", "A", "B", 100.0, 0),
            txn("T2", "B", "C", 50.0, 1),
            txn("T3", "C", "A", 25.0, 2),
        ];
        let g = Graph::build(&rows);
        let sccs = g.strongly_connected_components();
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), 3);
    }

    #[test]
    fn acyclic_chain_is_singletons() {
        let rows = vec![
            txn("T1", "A", "B", 100.0, 0),
            txn("T2", "B", "C", 50.0, 1),
        ];
        let g = Graph::build(&rows);
        let sccs = g.strongly_connected_components();
        assert_eq!(sccs.len(), 3);
        assert!(sccs.iter().all(|scc| scc.len() == 1));
    }
}
