//! Run configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Command line options are merged on top with [`TrainingConfig::merge`].
use crate::error::{Result, RiskError};
use crate::schema::LoanSchema;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_EPOCHS: usize = 100;
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Hyper-parameters of a training run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Seed for weight initialization; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(RiskError::InvalidConfig("epochs must be at least 1".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(RiskError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Random generator for weight initialization.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Override with whatever `epochs`, `learning_rate` or `seed` were given.
    pub fn merge(
        self,
        epochs: Option<usize>,
        learning_rate: Option<f64>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            epochs: epochs.unwrap_or(self.epochs),
            learning_rate: learning_rate.unwrap_or(self.learning_rate),
            seed: seed.or(self.seed),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub schema: LoanSchema,
    pub training: TrainingConfig,
}

impl RiskConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| RiskError::io(path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|source| RiskError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.training.validate()?;
        Ok(config)
    }
}
