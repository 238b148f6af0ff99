//! Engine and policy configuration.
//!
//! [`EngineConfig`] carries the window options recognized by the engine and
//! [`PolicyConfig`] describes one of the reference policies so that a whole
//! engine setup can be read from JSON:
//!
//! ```json
//! {
//!   "window_size": 60000,
//!   "initial_app_time": 0,
//!   "policy": { "type": "target_distance", "start": "A", "target": "E", "threshold": 3.0 }
//! }
//! ```

use crate::error::ConfigError;
use crate::graph::SimpleGraph;
use crate::policy::{
  BoxedPolicy, CentralityThreshold, DiameterThreshold, NeverClose, TargetDistanceThreshold,
  VertexCountThreshold,
};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Window options for a [`WindowingEngine`](crate::engine::WindowingEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Window length in logical milliseconds. Must be positive.
  pub window_size: i64,
  /// Starting watermark.
  #[serde(default)]
  pub initial_app_time: Timestamp,
}

impl EngineConfig {
  /// Creates a configuration with the given window size and a zero watermark.
  pub fn new(window_size: i64) -> Self {
    Self {
      window_size,
      initial_app_time: 0,
    }
  }

  /// Sets the initial watermark.
  pub fn with_initial_app_time(mut self, app_time: Timestamp) -> Self {
    self.initial_app_time = app_time;
    self
  }

  /// Checks the window size.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.window_size <= 0 {
      return Err(ConfigError::InvalidWindowSize(self.window_size));
    }
    Ok(())
  }
}

/// Serializable description of a reference policy over string-labelled graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyConfig {
  /// [`CentralityThreshold`].
  Centrality {
    /// Score at or above which the window closes.
    threshold: f64,
    /// Normalize scores into `[0, 1]`.
    #[serde(default)]
    normalized: bool,
  },
  /// [`DiameterThreshold`].
  Diameter {
    /// Diameter above which the window closes.
    threshold: f64,
  },
  /// [`TargetDistanceThreshold`].
  TargetDistance {
    /// Source vertex.
    start: String,
    /// Target vertex.
    target: String,
    /// Distance above which the window closes.
    threshold: f64,
    /// Clear the distance cache when a window closes.
    #[serde(default)]
    reset_on_close: bool,
  },
  /// [`VertexCountThreshold`].
  VertexCount {
    /// Vertex count at which the window closes.
    limit: usize,
  },
  /// [`NeverClose`].
  Never,
}

impl PolicyConfig {
  /// Checks thresholds for NaN.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let threshold = match self {
      Self::Centrality { threshold, .. }
      | Self::Diameter { threshold }
      | Self::TargetDistance { threshold, .. } => *threshold,
      Self::VertexCount { .. } | Self::Never => return Ok(()),
    };
    if threshold.is_nan() {
      return Err(ConfigError::InvalidPolicy("threshold is NaN".to_string()));
    }
    Ok(())
  }

  /// Instantiates the described policy.
  pub fn build(&self) -> Result<BoxedPolicy<SimpleGraph<String>>, ConfigError> {
    self.validate()?;
    let policy: BoxedPolicy<SimpleGraph<String>> = match self.clone() {
      Self::Centrality {
        threshold,
        normalized,
      } => Box::new(CentralityThreshold::<String>::new(threshold).with_normalization(normalized)),
      Self::Diameter { threshold } => Box::new(DiameterThreshold::new(threshold)),
      Self::TargetDistance {
        start,
        target,
        threshold,
        reset_on_close,
      } => Box::new(
        TargetDistanceThreshold::new(start, target, threshold).with_reset_on_close(reset_on_close),
      ),
      Self::VertexCount { limit } => Box::new(VertexCountThreshold::new(limit)),
      Self::Never => Box::new(NeverClose::new()),
    };
    Ok(policy)
  }
}

/// Complete engine setup: window options plus the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Window options.
  #[serde(flatten)]
  pub engine: EngineConfig,
  /// Close policy.
  pub policy: Option<PolicyConfig>,
}

impl Settings {
  /// Parses and validates settings from a JSON string.
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let settings: Settings = serde_json::from_str(json)?;
    settings.validate()?;
    Ok(settings)
  }

  /// Reads and validates settings from a JSON file.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json_str(&json)
  }

  /// Validates the window options and the policy.
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.engine.validate()?;
    self.policy_config()?.validate()
  }

  /// Returns the policy, which is required.
  pub fn policy_config(&self) -> Result<&PolicyConfig, ConfigError> {
    self.policy.as_ref().ok_or(ConfigError::Missing("policy"))
  }
}
