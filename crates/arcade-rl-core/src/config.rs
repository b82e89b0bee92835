//! Agent configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{AgentError, Result};

/// Size of a canonical grayscale frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
}

impl FrameSize {
    /// Create a new frame size
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// `(rows, cols)` shape as used by `ndarray`
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Number of pixels in one frame
    #[must_use]
    pub const fn pixels(&self) -> usize {
        self.width * self.height
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(84, 84)
    }
}

/// Configuration for the observation/action/replay loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Number of frames in one stacked observation (K)
    pub buffer_depth: usize,
    /// Canonical frame size
    pub frame_size: FrameSize,
    /// Number of discrete actions
    pub action_count: usize,
    /// Exploration rate at step 0
    pub initial_epsilon: f64,
    /// Exploration rate once annealing is over
    pub final_epsilon: f64,
    /// Annealing horizon in training steps
    pub exploration_steps: u64,
    /// Fixed exploration rate used while evaluating
    pub testing_epsilon: f64,
    /// Warm-up threshold before learning updates start
    pub steps_before_training: u64,
    /// Ceiling for a single estimator call
    pub estimator_timeout_ms: u64,
    /// Seed for action selection; entropy when absent
    pub seed: Option<u64>,
    /// Additional estimator-specific parameters
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            buffer_depth: 4,
            frame_size: FrameSize::default(),
            action_count: 4,
            initial_epsilon: 1.0,
            final_epsilon: 0.1,
            exploration_steps: 1_000_000,
            testing_epsilon: 0.01,
            steps_before_training: 50_000,
            estimator_timeout_ms: 5_000,
            seed: None,
            params: serde_json::Map::new(),
        }
    }
}

impl AgentConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), depth = config.buffer_depth, "loaded agent config");
        Ok(config)
    }

    /// Estimator call ceiling as a `Duration`
    #[must_use]
    pub fn estimator_timeout(&self) -> Duration {
        Duration::from_millis(self.estimator_timeout_ms)
    }

    /// Check ranges the agent relies on
    pub fn validate(&self) -> Result<()> {
        if self.buffer_depth == 0 {
            return Err(AgentError::Config("buffer_depth must be at least 1".into()));
        }
        if self.action_count == 0 {
            return Err(AgentError::Config("action_count must be at least 1".into()));
        }
        if self.frame_size.pixels() == 0 {
            return Err(AgentError::Config(format!(
                "frame_size must be non-empty, got {}x{}",
                self.frame_size.width, self.frame_size.height
            )));
        }
        for (name, value) in [
            ("initial_epsilon", self.initial_epsilon),
            ("final_epsilon", self.final_epsilon),
            ("testing_epsilon", self.testing_epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.estimator_timeout_ms == 0 {
            return Err(AgentError::Config("estimator_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
