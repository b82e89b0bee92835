//! Exploration schedules

use crate::AgentConfig;

/// Trait for schedules (e.g., for epsilon decay)
pub trait Schedule: Send + Sync {
    /// Get value at step t
    fn value(&self, t: u64) -> f64;
}

/// Linear schedule that moves from start to end over steps, then holds end
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSchedule {
    /// Starting value
    pub start: f64,
    /// Ending value
    pub end: f64,
    /// Number of steps for the transition
    pub steps: u64,
}

impl LinearSchedule {
    /// Create a new linear schedule
    #[must_use]
    pub fn new(start: f64, end: f64, steps: u64) -> Self {
        Self { start, end, steps }
    }
}

impl Schedule for LinearSchedule {
    #[allow(clippy::cast_precision_loss)]
    fn value(&self, t: u64) -> f64 {
        if t >= self.steps {
            self.end
        } else {
            self.start - (self.start - self.end) * t as f64 / self.steps as f64
        }
    }
}

/// Constant schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantSchedule {
    /// Constant value
    pub value: f64,
}

impl Schedule for ConstantSchedule {
    fn value(&self, _t: u64) -> f64 {
        self.value
    }
}

/// Epsilon used by the agent: annealed while training, fixed while testing
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationSchedule {
    training: LinearSchedule,
    testing: ConstantSchedule,
}

impl ExplorationSchedule {
    /// Create a schedule from explicit bounds
    #[must_use]
    pub fn new(initial: f64, final_epsilon: f64, steps: u64, testing: f64) -> Self {
        Self {
            training: LinearSchedule::new(initial, final_epsilon, steps),
            testing: ConstantSchedule { value: testing },
        }
    }

    /// Build from an agent configuration
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config.initial_epsilon,
            config.final_epsilon,
            config.exploration_steps,
            config.testing_epsilon,
        )
    }

    /// Training epsilon at a global step count
    #[must_use]
    pub fn epsilon(&self, step_count: u64) -> f64 {
        self.training.value(step_count)
    }

    /// Epsilon used unconditionally in evaluation mode
    #[must_use]
    pub fn testing_epsilon(&self) -> f64 {
        self.testing.value(0)
    }
}
