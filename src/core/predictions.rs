// src/core/predictions.rs
//! Turning a classifier's raw output into a ranked symbol shortlist.
use crate::core::types::SymbolId;
use std::borrow::Cow;

/// Concatenates a batch-shaped output (e.g. `1 x num_classes`) into one vector.
pub fn flatten<R: AsRef<[f64]>>(rows: &[R]) -> Vec<f64> {
    rows.iter().flat_map(|row| row.as_ref().iter().copied()).collect()
}

/// True when every value already lies in [0, 1].
///
/// This is a heuristic: the values are not required to sum to 1.
pub fn is_probability_range(values: &[f64]) -> bool {
    values.iter().all(|v| (0.0..=1.0).contains(v))
}

/// Numerically stable softmax. `+inf` entries share all the mass evenly;
/// NaN and `-inf` get zero probability.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let infinite = values.iter().filter(|&&v| v == f64::INFINITY).count();
    if infinite > 0 {
        let share = 1.0 / infinite as f64;
        return values
            .iter()
            .map(|&v| if v == f64::INFINITY { share } else { 0.0 })
            .collect();
    }

    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return vec![0.0; values.len()];
    }

    let exps: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() { (v - max).exp() } else { 0.0 })
        .collect();
    // The maximum contributes exp(0) = 1, so the sum is at least 1.
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Uses the values as probabilities when they are all in [0, 1], otherwise
/// treats the whole vector as logits and applies softmax.
pub fn normalize(values: &[f64]) -> Cow<'_, [f64]> {
    if is_probability_range(values) {
        Cow::Borrowed(values)
    } else {
        Cow::Owned(softmax(values))
    }
}

/// The `n` most probable classes, highest first. Equal probabilities resolve
/// to the lower symbol id.
pub fn top_symbols(probabilities: &[f64], n: usize) -> Vec<(SymbolId, f64)> {
    let mut indexed: Vec<(SymbolId, f64)> = probabilities
        .iter()
        .enumerate()
        .filter_map(|(i, &p)| SymbolId::try_from(i).ok().map(|id| (id, p)))
        .collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    indexed.truncate(n);
    indexed
}
