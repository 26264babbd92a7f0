//! Frequency counting over labeled training instances.
//!
//! Pure aggregation: class occurrences, (class, event) occurrences, per-class
//! totals for each event scope and the domains observed across all classes.
//! Every map is ordered, so two counts built from the same instances in a
//! different order compare equal.
use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::data_handling::{EventScope, FeatureEvent, LabeledInstance};
use crate::encoding::FeatureEncoding;
use crate::error::{NaiveBayesError, Result};

/// Per-class number of events seen in each scope (the `N_k` term).
pub type ScopeTotals = BTreeMap<EventScope, usize>;

/// Distinct values observed per scope, independent of class.
///
/// For text this holds the vocabulary, for tabular data one domain per feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureDomains {
    domains: BTreeMap<EventScope, BTreeSet<String>>,
}

impl FeatureDomains {
    pub fn insert(&mut self, event: &FeatureEvent) {
        self.domains
            .entry(event.scope())
            .or_default()
            .insert(event.value().to_string());
    }

    pub fn cardinality(&self, scope: &EventScope) -> usize {
        self.domains.get(scope).map_or(0, BTreeSet::len)
    }

    pub fn contains_scope(&self, scope: &EventScope) -> bool {
        self.domains.contains_key(scope)
    }

    pub fn values(&self, scope: &EventScope) -> Option<&BTreeSet<String>> {
        self.domains.get(scope)
    }

    /// The text vocabulary; empty for tabular models.
    pub fn vocabulary(&self) -> BTreeSet<String> {
        self.values(&EventScope::Vocabulary)
            .cloned()
            .unwrap_or_default()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &EventScope> {
        self.domains.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EventScope, &BTreeSet<String>)> {
        self.domains.iter()
    }

    pub fn merge(&mut self, other: FeatureDomains) {
        for (scope, values) in other.domains {
            self.domains.entry(scope).or_default().extend(values);
        }
    }
}

impl FromIterator<(EventScope, BTreeSet<String>)> for FeatureDomains {
    fn from_iter<I: IntoIterator<Item = (EventScope, BTreeSet<String>)>>(iter: I) -> Self {
        let mut domains = FeatureDomains::default();
        for (scope, values) in iter {
            domains.domains.entry(scope).or_default().extend(values);
        }
        domains
    }
}

/// Raw counts for a single class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassFrequencies {
    /// Number of training instances carrying this label.
    pub instances: usize,
    /// Joint (class, event) occurrence counts.
    pub event_counts: BTreeMap<FeatureEvent, usize>,
    /// Events seen per scope for this class.
    pub scope_totals: ScopeTotals,
}

impl ClassFrequencies {
    fn record(&mut self, event: FeatureEvent) {
        *self.scope_totals.entry(event.scope()).or_insert(0) += 1;
        *self.event_counts.entry(event).or_insert(0) += 1;
    }

    pub fn event_count(&self, event: &FeatureEvent) -> usize {
        self.event_counts.get(event).copied().unwrap_or(0)
    }

    pub fn scope_total(&self, scope: &EventScope) -> usize {
        self.scope_totals.get(scope).copied().unwrap_or(0)
    }

    fn merge(&mut self, other: ClassFrequencies) {
        self.instances += other.instances;
        for (event, count) in other.event_counts {
            *self.event_counts.entry(event).or_insert(0) += count;
        }
        for (scope, total) in other.scope_totals {
            *self.scope_totals.entry(scope).or_insert(0) += total;
        }
    }
}

/// Aggregated counts over a whole training set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyCounts {
    /// Total number of training instances (`n`).
    pub n_instances: usize,
    /// Per-label counts, in label order.
    pub classes: BTreeMap<String, ClassFrequencies>,
    /// Vocabulary or feature domains discovered while counting.
    pub domains: FeatureDomains,
}

impl FrequencyCounts {
    fn observe(&mut self, instance: &LabeledInstance, encoding: FeatureEncoding) -> Result<()> {
        let events = encoding.events(&instance.features)?;
        self.n_instances += 1;
        let class = self.classes.entry(instance.label.clone()).or_default();
        class.instances += 1;
        for event in events {
            self.domains.insert(&event);
            class.record(event);
        }
        Ok(())
    }

    /// Combine two partial counts. Addition is commutative and associative,
    /// so shards may be merged in any order.
    pub fn merge(mut self, other: FrequencyCounts) -> FrequencyCounts {
        self.n_instances += other.n_instances;
        for (label, class) in other.classes {
            self.classes.entry(label).or_default().merge(class);
        }
        self.domains.merge(other.domains);
        self
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &String> {
        self.classes.keys()
    }
}

/// Count class labels and feature events in a single pass.
///
/// # Errors
///
/// `EmptyTrainingSet` when `instances` is empty, `SchemaMismatch` when an
/// instance's features do not fit the encoding.
pub fn count(instances: &[LabeledInstance], encoding: FeatureEncoding) -> Result<FrequencyCounts> {
    if instances.is_empty() {
        return Err(NaiveBayesError::EmptyTrainingSet);
    }

    let mut counts = FrequencyCounts::default();
    for instance in instances {
        counts.observe(instance, encoding)?;
    }

    log::trace!(
        "Counted {} instances, {} labels, {} scopes",
        counts.n_instances,
        counts.n_classes(),
        counts.domains.scopes().count()
    );
    Ok(counts)
}

/// Same result as [`count`], with instances sharded across rayon workers and
/// the partial counts merged by addition.
pub fn count_parallel(
    instances: &[LabeledInstance],
    encoding: FeatureEncoding,
) -> Result<FrequencyCounts> {
    if instances.is_empty() {
        return Err(NaiveBayesError::EmptyTrainingSet);
    }

    let counts = instances
        .par_iter()
        .try_fold(FrequencyCounts::default, |mut acc, instance| {
            acc.observe(instance, encoding)?;
            Ok::<_, NaiveBayesError>(acc)
        })
        .try_reduce(FrequencyCounts::default, |a, b| Ok(a.merge(b)))?;

    log::trace!(
        "Counted {} instances in parallel, {} labels",
        counts.n_instances,
        counts.n_classes()
    );
    Ok(counts)
}
