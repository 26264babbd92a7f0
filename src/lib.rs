//! bayes-classifiers: Naive Bayes classification over text and tabular data.
//!
//! The crate provides the shared statistical core of two Naive Bayes
//! variants: a multinomial encoding over token counts (free text) and a
//! categorical encoding over discrete attribute values (tabular records).
//! Training counts class and feature-event frequencies, smooths them with an
//! additive α into log-space tables, and inference sums those tables per
//! class to pick the arg-max label. Unseen tokens and unseen values of known
//! features are scored with the same smoothing formula rather than dropped.
//!
//! Loading datasets and tokenizing text are left to callers; models consume
//! already-cleaned tokens or attribute values.
pub mod config;
pub mod counting;
pub mod data_handling;
pub mod encoding;
pub mod error;
pub mod estimator;
pub mod io;
pub mod models;

pub use config::ClassifierConfig;
pub use data_handling::{Features, LabeledInstance};
pub use encoding::FeatureEncoding;
pub use error::{NaiveBayesError, Result};
pub use models::NaiveBayesModel;
