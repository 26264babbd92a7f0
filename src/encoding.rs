//! Feature encodings: how an instance decomposes into countable events and
//! how an event never observed for a class is scored at inference time.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::counting::{FeatureDomains, ScopeTotals};
use crate::data_handling::{EventScope, FeatureEvent, Features};
use crate::error::{NaiveBayesError, Result};
use crate::estimator::smoothed_log_prob;

/// Supported encodings. Chosen when the model is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureEncoding {
    /// Token counts over a shared vocabulary (free text).
    #[default]
    Multinomial,
    /// One discrete value per feature column (tabular records).
    Categorical,
}

impl FeatureEncoding {
    /// Decompose raw features into feature events.
    ///
    /// Multinomial yields one event per token occurrence, so a token repeated
    /// three times yields three events. Categorical yields exactly one
    /// `(feature, value)` event per feature column.
    pub fn events(&self, features: &Features) -> Result<Vec<FeatureEvent>> {
        match (self, features) {
            (FeatureEncoding::Multinomial, Features::Tokens(tokens)) => Ok(tokens
                .iter()
                .map(|token| FeatureEvent::Token(token.clone()))
                .collect()),
            (FeatureEncoding::Categorical, Features::Attributes(attributes)) => Ok(attributes
                .iter()
                .map(|(feature, value)| FeatureEvent::Attribute {
                    feature: feature.clone(),
                    value: value.clone(),
                })
                .collect()),
            (encoding, features) => Err(NaiveBayesError::SchemaMismatch(format!(
                "{} encoding cannot consume {} features",
                encoding,
                features.kind()
            ))),
        }
    }

    /// Size V of the domain an event of `scope` is drawn from.
    ///
    /// Constant (vocabulary size) for multinomial, per feature for categorical.
    pub fn cardinality(&self, scope: &EventScope, domains: &FeatureDomains) -> usize {
        match self {
            FeatureEncoding::Multinomial => domains.cardinality(&EventScope::Vocabulary),
            FeatureEncoding::Categorical => domains.cardinality(scope),
        }
    }

    /// Reject events the trained schema cannot score.
    ///
    /// Unknown tokens are fine for multinomial models. A categorical event
    /// naming a feature absent from training is a caller error.
    pub fn check_event(&self, event: &FeatureEvent, domains: &FeatureDomains) -> Result<()> {
        match (self, event) {
            (FeatureEncoding::Multinomial, FeatureEvent::Token(_)) => Ok(()),
            (FeatureEncoding::Categorical, FeatureEvent::Attribute { feature, .. }) => {
                if domains.contains_scope(&event.scope()) {
                    Ok(())
                } else {
                    Err(NaiveBayesError::SchemaMismatch(format!(
                        "feature '{}' was not present during training",
                        feature
                    )))
                }
            }
            (encoding, event) => Err(NaiveBayesError::SchemaMismatch(format!(
                "{} encoding cannot score event {:?}",
                encoding, event
            ))),
        }
    }

    /// Log-probability of an event never observed together with a class.
    ///
    /// Same additive smoothing as the conditional table with a joint count of
    /// zero: `log(α / (N_k + α·V))`, where `N_k` is the class total for the
    /// event's scope. Tokens outside the vocabulary take this path as well.
    pub fn fallback_log_prob(
        &self,
        event: &FeatureEvent,
        class_totals: &ScopeTotals,
        domains: &FeatureDomains,
        alpha: f64,
    ) -> f64 {
        let scope = event.scope();
        let total = class_totals.get(&scope).copied().unwrap_or(0);
        smoothed_log_prob(0, total, alpha, self.cardinality(&scope, domains))
    }
}

impl fmt::Display for FeatureEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureEncoding::Multinomial => write!(f, "multinomial"),
            FeatureEncoding::Categorical => write!(f, "categorical"),
        }
    }
}

impl FromStr for FeatureEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multinomial" | "text" => Ok(FeatureEncoding::Multinomial),
            "categorical" | "tabular" => Ok(FeatureEncoding::Categorical),
            _ => Err(format!(
                "Unknown feature encoding: {}. Expected 'multinomial' or 'categorical'",
                s
            )),
        }
    }
}
