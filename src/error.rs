use std::error::Error;
use std::fmt;

/// Errors raised while training or querying a Naive Bayes model.
///
/// Every variant is fatal to the call that produced it. Unseen tokens and
/// unseen values of known features are not errors; they are scored through
/// the smoothing fallback instead.
#[derive(Debug, Clone, PartialEq)]
pub enum NaiveBayesError {
    /// The training set contains zero instances.
    EmptyTrainingSet,
    /// Fewer than two distinct labels were observed (number of labels seen).
    SingleClass(usize),
    /// `predict`/`score` was called before `train`.
    UntrainedModel,
    /// An instance does not match the trained schema or encoding.
    SchemaMismatch(String),
    /// `score` was asked about a label outside the trained label set.
    UnknownClass(String),
    /// The smoothing parameter is negative or not finite.
    InvalidAlpha(f64),
    /// A persisted snapshot failed validation.
    InvalidSnapshot(String),
}

impl fmt::Display for NaiveBayesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NaiveBayesError::EmptyTrainingSet => write!(f, "Training set contains no instances"),
            NaiveBayesError::SingleClass(n) => write!(
                f,
                "Training set needs at least 2 distinct labels, found {}",
                n
            ),
            NaiveBayesError::UntrainedModel => write!(f, "Model must be trained before inference"),
            NaiveBayesError::SchemaMismatch(msg) => write!(f, "Schema mismatch: {}", msg),
            NaiveBayesError::UnknownClass(label) => {
                write!(f, "Label '{}' was not seen during training", label)
            }
            NaiveBayesError::InvalidAlpha(alpha) => write!(
                f,
                "Smoothing parameter must be finite and non-negative, got {}",
                alpha
            ),
            NaiveBayesError::InvalidSnapshot(msg) => write!(f, "Invalid model snapshot: {}", msg),
        }
    }
}

impl Error for NaiveBayesError {}

pub type Result<T> = std::result::Result<T, NaiveBayesError>;
