//! Additive categorical scoring (spec §4.7): fuses the four per-category
//! score maps into a single per-account suspicion score.

use std::collections::{HashMap, HashSet};

use crate::suppression::SuppressionResult;

/// Fuse cycle/smurfing/shell/velocity category scores into `score = round(
/// cycle + multiplier·smurfing + shell + velocity, 1)` for every account
/// present in any category map.
pub fn fuse(
    cycle: &HashMap<String, f64>,
    smurfing: &HashMap<String, f64>,
    shell: &HashMap<String, f64>,
    velocity: &HashMap<String, f64>,
    suppression: &SuppressionResult,
) -> HashMap<String, f64> {
    let mut accounts: HashSet<&str> = HashSet::new();
    accounts.extend(cycle.keys().map(String::as_str));
    accounts.extend(smurfing.keys().map(String::as_str));
    accounts.extend(shell.keys().map(String::as_str));
    accounts.extend(velocity.keys().map(String::as_str));

    let mut scores = HashMap::with_capacity(accounts.len());
    for account in accounts {
        let c = cycle.get(account).copied().unwrap_or(0.0);
        let s = smurfing.get(account).copied().unwrap_or(0.0);
        let sh = shell.get(account).copied().unwrap_or(0.0);
        let v = velocity.get(account).copied().unwrap_or(0.0);
        let multiplier = suppression.multipliers.get(account).copied().unwrap_or(1.0);

        let total = c + multiplier * s + sh + v;
        scores.insert(account.to_string(), (total * 10.0).round() / 10.0);
    }
    scores
}
