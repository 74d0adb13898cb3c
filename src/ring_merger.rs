//! Ring merger (spec §4.8): Union-Find over suspicious accounts, grouping
//! members of each cycle/shell cluster into named fraud rings.
//!
//! The find/union pair is grounded directly on `find_components` in
//! `ey-asu-rnd-SyntheticData/crates/synth-eval/src/ml/graph.rs` — index-based
//! parent/rank arrays with path compression and union-by-rank — generalized
//! from unconditional edge-pair unions into the account-universe-filtered
//! cluster unions spec §4.8 describes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::patterns::family_of_label;
use crate::settings::Settings;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ring {
    pub ring_id: String,
    pub members: Vec<String>,
    pub pattern_type: String,
    pub risk_score: f64,
}

fn find(parent: &mut [usize], x: usize) -> usize {
    if parent[x] != x {
        parent[x] = find(parent, parent[x]);
    }
    parent[x]
}

fn union(parent: &mut [usize], rank: &mut [usize], x: usize, y: usize) {
    let px = find(parent, x);
    let py = find(parent, y);
    if px == py {
        return;
    }
    if rank[px] < rank[py] {
        parent[px] = py;
    } else if rank[px] > rank[py] {
        parent[py] = px;
    } else {
        parent[py] = px;
        rank[px] += 1;
    }
}

/// Returns the rings (size ≥ 2 groups) and the `account → ring_id` map every
/// universe account resolves to (`"NONE"` for singletons).
pub fn merge(
    clusters: &[HashSet<String>],
    scores: &HashMap<String, f64>,
    effective_flags: &HashMap<String, Vec<String>>,
    settings: &Settings,
) -> (Vec<Ring>, HashMap<String, String>) {
    let universe: Vec<String> = scores
        .iter()
        .filter(|(_, &score)| score >= settings.suspicious_score_threshold)
        .map(|(account, _)| account.clone())
        .collect();

    if universe.is_empty() {
        return (Vec::new(), HashMap::new());
    }

    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for (i, account) in universe.iter().enumerate() {
        index_of.insert(account.as_str(), i);
    }

    let mut parent: Vec<usize> = (0..universe.len()).collect();
    let mut rank: Vec<usize> = vec![0; universe.len()];

    for cluster in clusters {
        let members: Vec<usize> = cluster
            .iter()
            .filter_map(|m| index_of.get(m.as_str()).copied())
            .collect();
        for &other in members.iter().skip(1) {
            union(&mut parent, &mut rank, members[0], other);
        }
    }

    let mut groups: HashMap<usize, Vec<String>> = HashMap::new();
    for (i, account) in universe.iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(account.clone());
    }

    let mut ring_groups: Vec<Vec<String>> = groups.into_values().filter(|g| g.len() >= 2).collect();
    for group in &mut ring_groups {
        group.sort();
    }
    ring_groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let mut rings = Vec::with_capacity(ring_groups.len());
    let mut membership: HashMap<String, String> = HashMap::new();

    for (i, members) in ring_groups.into_iter().enumerate() {
        let ring_id = format!("RING_{:03}", i + 1);

        let mut ring_patterns: HashSet<String> = HashSet::new();
        for member in &members {
            if let Some(flags) = effective_flags.get(member) {
                ring_patterns.extend(flags.iter().cloned());
            }
        }

        let pattern_type = classify_pattern_type(&ring_patterns);
        let risk_score = compute_risk_score(&members, scores, &ring_patterns);

        for member in &members {
            membership.insert(member.clone(), ring_id.clone());
        }

        rings.push(Ring {
            ring_id,
            members,
            pattern_type,
            risk_score,
        });
    }

    (rings, membership)
}

fn classify_pattern_type(ring_patterns: &HashSet<String>) -> String {
    let families: HashSet<&'static str> = ring_patterns
        .iter()
        .filter_map(|label| family_of_label(label))
        .map(|family| match family {
            crate::patterns::Family::Cycle => "cycle",
            crate::patterns::Family::Smurfing => "smurfing",
            crate::patterns::Family::Shell => "shell",
            crate::patterns::Family::Velocity => "velocity",
        })
        .collect();

    match families.len() {
        0 => "unknown".to_string(),
        1 => families.into_iter().next().unwrap().to_string(),
        _ => "mixed".to_string(),
    }
}

fn compute_risk_score(members: &[String], scores: &HashMap<String, f64>, ring_patterns: &HashSet<String>) -> f64 {
    let mean_score = members.iter().filter_map(|m| scores.get(m)).sum::<f64>() / members.len() as f64;

    let distinct_families: HashSet<&'static str> = ring_patterns
        .iter()
        .filter_map(|label| family_of_label(label))
        .filter(|f| !matches!(f, crate::patterns::Family::Velocity))
        .map(|f| match f {
            crate::patterns::Family::Cycle => "cycle",
            crate::patterns::Family::Smurfing => "smurfing",
            crate::patterns::Family::Shell => "shell",
            crate::patterns::Family::Velocity => unreachable!(),
        })
        .collect();
    let pattern_bonus = (15.0f64).min(5.0 * (distinct_families.len() as f64 - 1.0).max(0.0));

    let cycle3_bonus = if ring_patterns.contains("cycle_length_3") { 10.0 } else { 0.0 };

    let raw = mean_score + pattern_bonus + cycle3_bonus;
    (100.0f64).min((raw * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_cluster_members_into_one_ring() {
        let clusters = vec![HashSet::from(["A".to_string(), "B".to_string(), "C".to_string()])];
        let scores = HashMap::from([
            ("A".to_string(), 15.0),
            ("B".to_string(), 15.0),
            ("C".to_string(), 15.0),
        ]);
        let flags = HashMap::from([
            ("A".to_string(), vec!["cycle_length_3".to_string()]),
            ("B".to_string(), vec!["cycle_length_3".to_string()]),
            ("C".to_string(), vec!["cycle_length_3".to_string()]),
        ]);
        let settings = Settings::default();
        let (rings, membership) = merge(&clusters, &scores, &flags, &settings);

        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].ring_id, "RING_001");
        assert_eq!(rings[0].members, vec!["A", "B", "C"]);
        assert_eq!(rings[0].pattern_type, "cycle");
        assert_eq!(membership["A"], "RING_001");
    }

    #[test]
    fn below_threshold_accounts_form_no_rings() {
        let clusters = vec![HashSet::from(["A".to_string(), "B".to_string()])];
        let scores = HashMap::from([("A".to_string(), 1.0), ("B".to_string(), 1.0)]);
        let settings = Settings::default();
        let (rings, membership) = merge(&clusters, &scores, &HashMap::new(), &settings);
        assert!(rings.is_empty());
        assert!(membership.is_empty());
    }

    #[test]
    fn singleton_groups_are_not_rings() {
        let clusters: Vec<HashSet<String>> = Vec::new();
        let scores = HashMap::from([("A".to_string(), 50.0)]);
        let settings = Settings::default();
        let (rings, membership) = merge(&clusters, &scores, &HashMap::new(), &settings);
        assert!(rings.is_empty());
        assert!(membership.is_empty());
    }

    #[test]
    fn mixed_families_get_mixed_pattern_type_and_bonus() {
        let clusters = vec![HashSet::from(["A".to_string(), "B".to_string()])];
        let scores = HashMap::from([("A".to_string(), 15.0), ("B".to_string(), 15.0)]);
        let flags = HashMap::from([
            ("A".to_string(), vec!["cycle_length_4".to_string()]),
            ("B".to_string(), vec!["shell_source".to_string()]),
        ]);
        let settings = Settings::default();
        let (rings, _) = merge(&clusters, &scores, &flags, &settings);
        assert_eq!(rings[0].pattern_type, "mixed");
        // mean 15.0 + pattern_bonus 5.0 (2 distinct families) + no cycle3 bonus
        assert_eq!(rings[0].risk_score, 20.0);
    }
}
