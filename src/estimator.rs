//! Additive (Laplace/Lidstone) smoothing of raw counts into log-space tables.
use std::collections::BTreeMap;

use crate::counting::FrequencyCounts;
use crate::data_handling::{EventScope, FeatureEvent};

/// Log of the smoothed class prior, keyed by label.
pub type LogPriorTable = BTreeMap<String, f64>;

/// Log of the smoothed class-conditional probability for every observed
/// (class, event) pair.
pub type LogConditionalTable = BTreeMap<String, BTreeMap<FeatureEvent, f64>>;

/// Smoothed log-probability `log((count + α) / (total + α·cardinality))`.
///
/// Computed as a difference of logs so the raw ratio is never formed.
/// A zero numerator (only possible with `α = 0`) gives `-inf`. A zero
/// denominator means the scope was never observed in any class and has an
/// empty domain; the result is `0.0` so the event weighs equally on every class.
pub fn smoothed_log_prob(count: usize, total: usize, alpha: f64, cardinality: usize) -> f64 {
    let numerator = count as f64 + alpha;
    let denominator = total as f64 + alpha * cardinality as f64;

    if numerator == 0.0 {
        return f64::NEG_INFINITY;
    }
    if denominator == 0.0 {
        return 0.0;
    }
    numerator.ln() - denominator.ln()
}

/// `log_prior(k) = log((N_k + α) / (n + α·K))`.
pub fn estimate_priors(counts: &FrequencyCounts, alpha: f64) -> LogPriorTable {
    let n_classes = counts.n_classes();
    counts
        .classes
        .iter()
        .map(|(label, class)| {
            let log_prior =
                smoothed_log_prob(class.instances, counts.n_instances, alpha, n_classes);
            (label.clone(), log_prior)
        })
        .collect()
}

/// `log_cond(k, e) = log((N_{k,e} + α) / (N_k + α·V))`.
///
/// `cardinality_fn` supplies V for an event's scope: the vocabulary size for
/// text, the domain size of the event's feature for tabular data.
pub fn estimate_conditionals<F>(
    counts: &FrequencyCounts,
    alpha: f64,
    cardinality_fn: F,
) -> LogConditionalTable
where
    F: Fn(&EventScope) -> usize,
{
    let mut table = LogConditionalTable::new();
    for (label, class) in &counts.classes {
        let row = class
            .event_counts
            .iter()
            .map(|(event, &count)| {
                let scope = event.scope();
                let log_cond = smoothed_log_prob(
                    count,
                    class.scope_total(&scope),
                    alpha,
                    cardinality_fn(&scope),
                );
                (event.clone(), log_cond)
            })
            .collect();
        table.insert(label.clone(), row);
    }

    log::debug!(
        "Estimated {} conditional entries over {} classes (alpha = {})",
        table.values().map(BTreeMap::len).sum::<usize>(),
        table.len(),
        alpha
    );
    table
}
