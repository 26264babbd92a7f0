//! Instance and feature-event types shared by the counter, estimator and model.
//!
//! A training instance is a label plus either a token sequence (text) or a
//! feature-name to value mapping (tabular records). Tokenization and dataset
//! loading happen upstream; the types here only carry already-cleaned values.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw features of a single instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Features {
    /// Ordered token sequence; repeated tokens are counted individually.
    Tokens(Vec<String>),
    /// One discrete value per feature name.
    Attributes(BTreeMap<String, String>),
}

impl Features {
    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Features::Tokens(tokens.into_iter().map(Into::into).collect())
    }

    pub fn attributes<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Features::Attributes(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the feature kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Features::Tokens(_) => "tokens",
            Features::Attributes(_) => "attributes",
        }
    }
}

/// A labeled training record. The model never mutates instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledInstance {
    pub label: String,
    pub features: Features,
}

impl LabeledInstance {
    pub fn new(label: impl Into<String>, features: Features) -> Self {
        Self {
            label: label.into(),
            features,
        }
    }

    pub fn text<I, S>(label: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(label, Features::tokens(tokens))
    }

    pub fn tabular<I, K, V>(label: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(label, Features::attributes(pairs))
    }
}

/// The domain a feature event is drawn from.
///
/// Per-class event totals and domain cardinalities are both keyed by scope:
/// text models have a single `Vocabulary` scope, tabular models one scope per
/// feature column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    Vocabulary,
    Feature(String),
}

impl fmt::Display for EventScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventScope::Vocabulary => write!(f, "vocabulary"),
            EventScope::Feature(name) => write!(f, "feature '{}'", name),
        }
    }
}

/// Atomic countable unit of evidence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureEvent {
    Token(String),
    Attribute { feature: String, value: String },
}

impl FeatureEvent {
    pub fn scope(&self) -> EventScope {
        match self {
            FeatureEvent::Token(_) => EventScope::Vocabulary,
            FeatureEvent::Attribute { feature, .. } => EventScope::Feature(feature.clone()),
        }
    }

    /// The value this event contributes to its scope's domain.
    pub fn value(&self) -> &str {
        match self {
            FeatureEvent::Token(token) => token,
            FeatureEvent::Attribute { value, .. } => value,
        }
    }

    /// Rebuild an event from its scope and domain value.
    pub fn from_parts(scope: &EventScope, value: impl Into<String>) -> Self {
        match scope {
            EventScope::Vocabulary => FeatureEvent::Token(value.into()),
            EventScope::Feature(feature) => FeatureEvent::Attribute {
                feature: feature.clone(),
                value: value.into(),
            },
        }
    }
}

/// Log a short overview of a training set: instance count and label balance.
pub fn log_training_summary(instances: &[LabeledInstance]) {
    let mut per_label: BTreeMap<&str, usize> = BTreeMap::new();
    for instance in instances {
        *per_label.entry(instance.label.as_str()).or_insert(0) += 1;
    }
    log::info!(
        "Training on {} instances across {} labels",
        instances.len(),
        per_label.len()
    );
    for (label, count) in per_label {
        log::debug!("  label '{}': {} instances", label, count);
    }
}
