use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BioflowError, Result};

/// Runtime configuration for the engine and the organs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Use the recorded reference brain data instead of synthetic patterns
    #[serde(default = "default_true")]
    pub use_real_data: bool,

    /// Enable learning and adaptation in the consciousness engine
    #[serde(default = "default_true")]
    pub learning_enabled: bool,

    /// Seed for synthetic brain data (random when unset)
    #[serde(default)]
    pub synthetic_seed: Option<u64>,

    /// Mean SpO2 (%) below which hypoxia risk is flagged
    #[serde(default = "default_hypoxia_threshold")]
    pub hypoxia_threshold: f64,

    /// EMG amplitude (mV) that maps to full activation
    #[serde(default = "default_emg_full_scale")]
    pub emg_full_scale_mv: f64,

    /// Respiratory template compared against the first nine breaths
    #[serde(default = "default_nine_beat_reference")]
    pub nine_beat_reference: Vec<f64>,

    /// Minimum correlation with the template to report a 9-beat pattern
    #[serde(default = "default_nine_beat_threshold")]
    pub nine_beat_threshold: f64,

    /// Bound on learned patterns and processing history kept in memory
    #[serde(default = "default_history_limit")]
    pub pattern_history_limit: usize,
}

fn default_true() -> bool {
    true
}
fn default_hypoxia_threshold() -> f64 {
    92.0
}
fn default_emg_full_scale() -> f64 {
    3.0
}
fn default_nine_beat_reference() -> Vec<f64> {
    vec![8.3; 9]
}
fn default_nine_beat_threshold() -> f64 {
    0.8
}
fn default_history_limit() -> usize {
    1000
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            use_real_data: true,
            learning_enabled: true,
            synthetic_seed: None,
            hypoxia_threshold: default_hypoxia_threshold(),
            emg_full_scale_mv: default_emg_full_scale(),
            nine_beat_reference: default_nine_beat_reference(),
            nine_beat_threshold: default_nine_beat_threshold(),
            pattern_history_limit: default_history_limit(),
        }
    }
}

impl FlowConfig {
    /// Synthetic brain data with a fixed seed, for reproducible runs
    pub fn synthetic(seed: u64) -> Self {
        Self {
            use_real_data: false,
            synthetic_seed: Some(seed),
            ..Default::default()
        }
    }

    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BioflowError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: FlowConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded flow config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.emg_full_scale_mv.is_finite() || self.emg_full_scale_mv <= 0.0 {
            return Err(BioflowError::InvalidParameter(format!(
                "emg_full_scale_mv must be positive, got {}",
                self.emg_full_scale_mv
            )));
        }
        if !(-1.0..=1.0).contains(&self.nine_beat_threshold) {
            return Err(BioflowError::InvalidParameter(format!(
                "nine_beat_threshold must be within [-1, 1], got {}",
                self.nine_beat_threshold
            )));
        }
        if self.nine_beat_reference.len() != 9 {
            return Err(BioflowError::InvalidParameter(format!(
                "nine_beat_reference must have 9 values, got {}",
                self.nine_beat_reference.len()
            )));
        }
        if self.pattern_history_limit == 0 {
            return Err(BioflowError::InvalidParameter(
                "pattern_history_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default location of the persisted engine state
pub fn default_state_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bioflow")
        .join("engine_state.json")
}
