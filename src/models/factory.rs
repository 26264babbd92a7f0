use crate::config::ClassifierConfig;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::naive_bayes::NaiveBayesModel;

/// Build a boxed, untrained classifier model from a `ClassifierConfig`.
/// The encoding variant is fixed here and never inferred per call.
pub fn build_model(config: ClassifierConfig) -> Box<dyn ClassifierModel> {
    log::debug!(
        "Building {} Naive Bayes model (alpha = {})",
        config.encoding,
        config.alpha
    );
    Box::new(NaiveBayesModel::new(config))
}
