pub mod naive_bayes;

pub mod classifier_trait;
pub mod factory;

pub use naive_bayes::{NaiveBayesModel, TrainedTables};
