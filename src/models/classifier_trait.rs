use crate::data_handling::{Features, LabeledInstance};
use crate::error::Result;

/// A small trait abstraction over trainable label classifiers, so callers
/// built from a config via the factory do not depend on a concrete model.
pub trait ClassifierModel: Send + Sync {
    /// Fit the model from scratch on labeled instances.
    fn fit(&mut self, instances: &[LabeledInstance]) -> Result<()>;

    /// Predict the most likely label.
    fn predict(&self, features: &Features) -> Result<String>;

    /// Unnormalized log score of `features` under `label`.
    fn score(&self, features: &Features, label: &str) -> Result<f64>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
