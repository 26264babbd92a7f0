//! Persisted state of a trained model.
//!
//! A snapshot stores α, the encoding and the trained tables as flat rows of
//! key → value, which serialize cleanly to JSON regardless of what characters
//! labels, tokens or feature names contain.
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::counting::{FeatureDomains, ScopeTotals};
use crate::data_handling::{EventScope, FeatureEvent};
use crate::encoding::FeatureEncoding;
use crate::error::NaiveBayesError;
use crate::estimator::{LogConditionalTable, LogPriorTable};
use crate::models::{NaiveBayesModel, TrainedTables};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorEntry {
    pub label: String,
    pub log_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalEntry {
    pub label: String,
    pub event: FeatureEvent,
    pub log_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalEntry {
    pub label: String,
    pub scope: EventScope,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEntry {
    pub scope: EventScope,
    pub values: Vec<String>,
}

/// Serializable form of a trained `NaiveBayesModel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub alpha: f64,
    pub encoding: FeatureEncoding,
    pub log_priors: Vec<PriorEntry>,
    pub log_conditionals: Vec<ConditionalEntry>,
    pub class_totals: Vec<TotalEntry>,
    pub domains: Vec<DomainEntry>,
}

impl ModelSnapshot {
    /// Capture the tables of a trained model.
    pub fn from_model(model: &NaiveBayesModel) -> Result<Self, NaiveBayesError> {
        let tables = model.tables().ok_or(NaiveBayesError::UntrainedModel)?;

        let log_priors = tables
            .log_priors
            .iter()
            .map(|(label, &log_prob)| PriorEntry {
                label: label.clone(),
                log_prob,
            })
            .collect();

        let log_conditionals = tables
            .log_conditionals
            .iter()
            .flat_map(|(label, row)| {
                row.iter().map(move |(event, &log_prob)| ConditionalEntry {
                    label: label.clone(),
                    event: event.clone(),
                    log_prob,
                })
            })
            .collect();

        let class_totals = tables
            .class_totals
            .iter()
            .flat_map(|(label, totals)| {
                totals.iter().map(move |(scope, &total)| TotalEntry {
                    label: label.clone(),
                    scope: scope.clone(),
                    total,
                })
            })
            .collect();

        let domains = tables
            .domains
            .iter()
            .map(|(scope, values)| DomainEntry {
                scope: scope.clone(),
                values: values.iter().cloned().collect(),
            })
            .collect();

        Ok(ModelSnapshot {
            alpha: model.alpha(),
            encoding: model.encoding(),
            log_priors,
            log_conditionals,
            class_totals,
            domains,
        })
    }

    /// Rebuild a trained model, validating the table invariants.
    pub fn into_model(self) -> Result<NaiveBayesModel, NaiveBayesError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(NaiveBayesError::InvalidAlpha(self.alpha));
        }

        let mut log_priors = LogPriorTable::new();
        for entry in self.log_priors {
            if entry.log_prob.is_nan() || entry.log_prob == f64::INFINITY {
                return Err(NaiveBayesError::InvalidSnapshot(format!(
                    "prior for '{}' is {}",
                    entry.label, entry.log_prob
                )));
            }
            if log_priors.insert(entry.label.clone(), entry.log_prob).is_some() {
                return Err(NaiveBayesError::InvalidSnapshot(format!(
                    "duplicate prior for '{}'",
                    entry.label
                )));
            }
        }
        if log_priors.len() < 2 {
            return Err(NaiveBayesError::SingleClass(log_priors.len()));
        }

        let mut log_conditionals = LogConditionalTable::new();
        for entry in self.log_conditionals {
            if !log_priors.contains_key(&entry.label) {
                return Err(NaiveBayesError::InvalidSnapshot(format!(
                    "conditional entry for unknown label '{}'",
                    entry.label
                )));
            }
            if !entry.log_prob.is_finite() || entry.log_prob > 0.0 {
                return Err(NaiveBayesError::InvalidSnapshot(format!(
                    "conditional for '{}' / {:?} is {}",
                    entry.label, entry.event, entry.log_prob
                )));
            }
            log_conditionals
                .entry(entry.label)
                .or_default()
                .insert(entry.event, entry.log_prob);
        }

        let mut class_totals: BTreeMap<String, ScopeTotals> = log_priors
            .keys()
            .map(|label| (label.clone(), ScopeTotals::new()))
            .collect();
        for entry in self.class_totals {
            let totals = class_totals.get_mut(&entry.label).ok_or_else(|| {
                NaiveBayesError::InvalidSnapshot(format!(
                    "event total for unknown label '{}'",
                    entry.label
                ))
            })?;
            totals.insert(entry.scope, entry.total);
        }

        let domains: FeatureDomains = self
            .domains
            .into_iter()
            .map(|entry| (entry.scope, entry.values.into_iter().collect::<BTreeSet<_>>()))
            .collect();

        let tables = TrainedTables {
            log_priors,
            log_conditionals,
            domains,
            class_totals,
        };
        let config = ClassifierConfig::new(self.alpha, self.encoding);
        Ok(NaiveBayesModel::from_parts(config, tables))
    }
}

/// Write a trained model to a JSON file.
pub fn save_model<P: AsRef<Path>>(model: &NaiveBayesModel, path: P) -> Result<()> {
    let snapshot = ModelSnapshot::from_model(model).context("Cannot snapshot model")?;
    let file = File::create(&path)
        .with_context(|| format!("Failed to create model file: {}", path.as_ref().display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &snapshot)
        .with_context(|| format!("Failed to write model: {}", path.as_ref().display()))?;
    log::info!(
        "Saved {} model with {} classes to {}",
        snapshot.encoding,
        snapshot.log_priors.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Read a trained model from a JSON file written by [`save_model`].
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<NaiveBayesModel> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open model file: {}", path.as_ref().display()))?;
    let snapshot: ModelSnapshot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse model: {}", path.as_ref().display()))?;
    let model = snapshot
        .into_model()
        .with_context(|| format!("Invalid model file: {}", path.as_ref().display()))?;
    log::info!("Loaded {} model from {}", model.encoding(), path.as_ref().display());
    Ok(model)
}
