//! Observation, action and replay orchestration for pixel-based game agents
//!
//! This crate provides the agent loop that sits between a game emulator and
//! a learning system:
//! - Frame stacking and epsilon-greedy action selection
//! - Named action modes for evaluation
//! - Replay recording with episode-start padding
//! - Deadline enforcement for blocking value estimators

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod buffer;
pub mod deadline;
pub mod episode;
pub mod policy;
pub mod recorder;

// Re-export the agent
pub use agent::Agent;

// Re-export replay components
pub use buffer::ReplayBuffer;
pub use recorder::ReplayRecorder;

// Re-export policy components
pub use policy::{greedy_action, ActionMode, ActionSelector, Boltzmann, EpsilonGreedy, Phase};

pub use deadline::DeadlineEstimator;
pub use episode::{Episode, EpisodeTracker};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActionMode, Agent, Boltzmann, DeadlineEstimator, EpsilonGreedy, ReplayBuffer,
    };
    pub use arcade_rl_core::prelude::*;
}
