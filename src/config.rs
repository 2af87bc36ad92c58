use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::feature_extractor::RunMode;

/// Relative importance of each feature group in an encoded vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeights {
    pub category: f32,
    pub color: f32,
    pub price: f32,
    pub age: f32,
}

pub const DEFAULT_FEATURE_WEIGHTS: FeatureWeights = FeatureWeights {
    category: 0.4,
    color: 0.3,
    price: 0.2,
    age: 0.1,
};

impl Default for FeatureWeights {
    fn default() -> Self {
        DEFAULT_FEATURE_WEIGHTS
    }
}

impl FeatureWeights {
    pub(crate) fn validate(&self) -> Result<()> {
        let weights = [
            ("category", self.category),
            ("color", self.color),
            ("price", self.price),
            ("age", self.age),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "weight {name} must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for FeatureWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weights (category: {}, color: {}, price: {}, age: {})",
            self.category, self.color, self.price, self.age
        )
    }
}

/// Tunables for training and recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: FeatureWeights,
    pub run_mode: RunMode,
    pub num_recommendations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_FEATURE_WEIGHTS,
            run_mode: RunMode::Parallel,
            num_recommendations: 10,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: EngineConfig = serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        config.weights.validate()?;
        Ok(config)
    }
}
