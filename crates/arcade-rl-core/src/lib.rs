//! Core frame, replay and exploration types for pixel-based game agents
//!
//! This crate provides the data model shared by the agent loop and its
//! collaborators: grayscale frames and the rolling frame stack, replay
//! transitions, the exploration schedule, configuration and errors, plus
//! the traits the loop drives (perception, value estimation, learning and
//! replay storage).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod perception;
pub mod replay;
pub mod schedule;
pub mod transition;

// Re-export core traits and types
pub use config::{AgentConfig, FrameSize};
pub use error::{AgentError, Result};
pub use estimator::{EstimatorOutput, ValueEstimator};
pub use frame::{blank_frame, Frame, FrameBuffer};
pub use perception::{GrayscaleResize, Perception};
pub use replay::{Learner, NoopLearner, ReplayMemory};
pub use schedule::{ConstantSchedule, ExplorationSchedule, LinearSchedule, Schedule};
pub use transition::{clip_reward, Transition};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AgentConfig, AgentError, EstimatorOutput, Frame, FrameBuffer, FrameSize, Learner,
        Perception, ReplayMemory, Result, Transition, ValueEstimator,
    };
}
