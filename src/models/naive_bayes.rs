use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::config::ClassifierConfig;
use crate::counting::{count, count_parallel, FeatureDomains, FrequencyCounts, ScopeTotals};
use crate::data_handling::{log_training_summary, FeatureEvent, Features, LabeledInstance};
use crate::encoding::FeatureEncoding;
use crate::error::{NaiveBayesError, Result};
use crate::estimator::{estimate_conditionals, estimate_priors, LogConditionalTable, LogPriorTable};
use crate::models::classifier_trait::ClassifierModel;

/// Everything a trained model needs at inference time.
///
/// Built once per `train` call and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedTables {
    pub log_priors: LogPriorTable,
    pub log_conditionals: LogConditionalTable,
    pub domains: FeatureDomains,
    /// Per-class event totals by scope, needed by the unseen-event fallback.
    pub class_totals: BTreeMap<String, ScopeTotals>,
}

impl TrainedTables {
    fn from_counts(counts: FrequencyCounts, encoding: FeatureEncoding, alpha: f64) -> Self {
        let log_priors = estimate_priors(&counts, alpha);
        let log_conditionals = estimate_conditionals(&counts, alpha, |scope| {
            encoding.cardinality(scope, &counts.domains)
        });
        let class_totals = counts
            .classes
            .iter()
            .map(|(label, class)| (label.clone(), class.scope_totals.clone()))
            .collect();

        TrainedTables {
            log_priors,
            log_conditionals,
            domains: counts.domains,
            class_totals,
        }
    }

    /// The frozen label set, in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &String> {
        self.log_priors.keys()
    }
}

/// Naive Bayes classifier over a fixed feature encoding.
///
/// The model starts untrained; `train` replaces the whole table set on
/// success and leaves the previous one untouched on failure. Inference only
/// reads the tables, so a trained model can be shared across threads.
#[derive(Debug, Clone)]
pub struct NaiveBayesModel {
    config: ClassifierConfig,
    tables: Option<TrainedTables>,
}

impl NaiveBayesModel {
    pub fn new(config: ClassifierConfig) -> Self {
        NaiveBayesModel {
            config,
            tables: None,
        }
    }

    pub fn with_alpha(encoding: FeatureEncoding, alpha: f64) -> Self {
        Self::new(ClassifierConfig::new(alpha, encoding))
    }

    pub(crate) fn from_parts(config: ClassifierConfig, tables: TrainedTables) -> Self {
        NaiveBayesModel {
            config,
            tables: Some(tables),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn alpha(&self) -> f64 {
        self.config.alpha
    }

    pub fn encoding(&self) -> FeatureEncoding {
        self.config.encoding
    }

    pub fn is_trained(&self) -> bool {
        self.tables.is_some()
    }

    pub fn tables(&self) -> Option<&TrainedTables> {
        self.tables.as_ref()
    }

    /// Fit priors and conditionals from a batch of labeled instances.
    ///
    /// # Errors
    ///
    /// * `InvalidAlpha` if α is negative or not finite.
    /// * `EmptyTrainingSet` if `instances` is empty.
    /// * `SingleClass` if fewer than two distinct labels are present.
    /// * `SchemaMismatch` if an instance does not fit the encoding.
    pub fn train(&mut self, instances: &[LabeledInstance]) -> Result<()> {
        let alpha = self.config.alpha;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(NaiveBayesError::InvalidAlpha(alpha));
        }
        if instances.is_empty() {
            return Err(NaiveBayesError::EmptyTrainingSet);
        }
        let distinct_labels: BTreeSet<&str> =
            instances.iter().map(|i| i.label.as_str()).collect();
        if distinct_labels.len() < 2 {
            return Err(NaiveBayesError::SingleClass(distinct_labels.len()));
        }

        log_training_summary(instances);

        let counts = if self.config.parallel {
            count_parallel(instances, self.config.encoding)?
        } else {
            count(instances, self.config.encoding)?
        };
        let tables = TrainedTables::from_counts(counts, self.config.encoding, alpha);

        log::info!(
            "Trained {} model: {} classes, {} scopes",
            self.config.encoding,
            tables.log_priors.len(),
            tables.domains.scopes().count()
        );
        self.tables = Some(tables);
        Ok(())
    }

    fn trained(&self) -> Result<&TrainedTables> {
        self.tables.as_ref().ok_or(NaiveBayesError::UntrainedModel)
    }

    /// Labels observed during training, in sorted order.
    pub fn classes(&self) -> Result<Vec<&str>> {
        Ok(self.trained()?.classes().map(String::as_str).collect())
    }

    pub fn log_prior(&self, label: &str) -> Result<f64> {
        self.trained()?
            .log_priors
            .get(label)
            .copied()
            .ok_or_else(|| NaiveBayesError::UnknownClass(label.to_string()))
    }

    /// Smoothed log-probability of `event` given `label`, falling back to the
    /// zero-count formula for pairs not seen in training.
    pub fn log_conditional(&self, label: &str, event: &FeatureEvent) -> Result<f64> {
        let tables = self.trained()?;
        if !tables.log_priors.contains_key(label) {
            return Err(NaiveBayesError::UnknownClass(label.to_string()));
        }
        self.config.encoding.check_event(event, &tables.domains)?;
        Ok(self.event_log_prob(tables, label, event))
    }

    fn event_log_prob(&self, tables: &TrainedTables, label: &str, event: &FeatureEvent) -> f64 {
        if let Some(&log_cond) = tables
            .log_conditionals
            .get(label)
            .and_then(|row| row.get(event))
        {
            return log_cond;
        }

        let empty = ScopeTotals::new();
        let totals = tables.class_totals.get(label).unwrap_or(&empty);
        self.config
            .encoding
            .fallback_log_prob(event, totals, &tables.domains, self.config.alpha)
    }

    /// Decompose features and reject events the trained schema cannot score.
    fn checked_events(
        &self,
        tables: &TrainedTables,
        features: &Features,
    ) -> Result<Vec<FeatureEvent>> {
        let events = self.config.encoding.events(features)?;
        for event in &events {
            self.config.encoding.check_event(event, &tables.domains)?;
        }
        Ok(events)
    }

    fn score_events(
        &self,
        tables: &TrainedTables,
        log_prior: f64,
        label: &str,
        events: &[FeatureEvent],
    ) -> f64 {
        events.iter().fold(log_prior, |acc, event| {
            acc + self.event_log_prob(tables, label, event)
        })
    }

    /// Unnormalized log posterior: `log_prior(label) + Σ log P(event | label)`.
    pub fn score(&self, features: &Features, label: &str) -> Result<f64> {
        let tables = self.trained()?;
        let log_prior = tables
            .log_priors
            .get(label)
            .copied()
            .ok_or_else(|| NaiveBayesError::UnknownClass(label.to_string()))?;
        let events = self.checked_events(tables, features)?;
        Ok(self.score_events(tables, log_prior, label, &events))
    }

    /// Log score of `features` under every trained label, in label order.
    pub fn class_scores(&self, features: &Features) -> Result<Vec<(String, f64)>> {
        let tables = self.trained()?;
        let events = self.checked_events(tables, features)?;
        Ok(tables
            .log_priors
            .iter()
            .map(|(label, &log_prior)| {
                (label.clone(), self.score_events(tables, log_prior, label, &events))
            })
            .collect())
    }

    /// Arg-max label. Exact ties go to the label that sorts first.
    pub fn predict(&self, features: &Features) -> Result<String> {
        let mut best: Option<(String, f64)> = None;
        for (label, score) in self.class_scores(features)? {
            let improves = best.as_ref().map_or(true, |(_, best_score)| score > *best_score);
            if improves {
                best = Some((label, score));
            }
        }
        log::trace!("Predicted {:?}", best);
        best.map(|(label, _)| label)
            .ok_or(NaiveBayesError::UntrainedModel)
    }

    /// Predict a batch of instances in parallel; output order follows input.
    pub fn predict_batch(&self, batch: &[Features]) -> Result<Vec<String>> {
        self.trained()?;
        batch
            .par_iter()
            .map(|features| self.predict(features))
            .collect()
    }
}

impl ClassifierModel for NaiveBayesModel {
    fn fit(&mut self, instances: &[LabeledInstance]) -> Result<()> {
        self.train(instances)
    }

    fn predict(&self, features: &Features) -> Result<String> {
        NaiveBayesModel::predict(self, features)
    }

    fn score(&self, features: &Features, label: &str) -> Result<f64> {
        NaiveBayesModel::score(self, features, label)
    }

    fn name(&self) -> &str {
        match self.config.encoding {
            FeatureEncoding::Multinomial => "multinomial_naive_bayes",
            FeatureEncoding::Categorical => "categorical_naive_bayes",
        }
    }
}
