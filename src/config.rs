use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::encoding::FeatureEncoding;

/// Smoothing strength used when none is configured.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Central configuration for Naive Bayes models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Additive smoothing parameter shared by priors and conditionals.
    pub alpha: f64,
    pub encoding: FeatureEncoding,
    /// Shard frequency counting across rayon workers.
    pub parallel: bool,
}

impl ClassifierConfig {
    pub fn new(alpha: f64, encoding: FeatureEncoding) -> Self {
        Self {
            alpha,
            encoding,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            encoding: FeatureEncoding::default(),
            parallel: false,
        }
    }
}

/// Load a classifier configuration from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClassifierConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: ClassifierConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    log::debug!("Loaded config from {}: {:?}", path.as_ref().display(), config);
    Ok(config)
}
