//! Small numeric helpers shared by the detectors: median/mean/coefficient of
//! variation over `amount` columns, each with the degenerate-input behavior
//! spec §4.2/§4.3/§4.6 calls for in place of an error (spec §7
//! `NumericDegenerate`).

/// Median of a slice of amounts. Does not mutate the caller's slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (Bessel-corrected, divides by `n - 1`), matching
/// pandas' default `.std()` — the only standard-deviation call in the
/// payroll/merchant suppression ground truth. `0.0` below `n = 2`, where the
/// correction is undefined.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Coefficient of variation, `std/mean`. `None` when degenerate
/// (fewer than 2 values or zero mean) so callers can apply the
/// documented neutral fallback instead of dividing by zero.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    if m == 0.0 {
        return None;
    }
    Some(std_dev(values) / m)
}
