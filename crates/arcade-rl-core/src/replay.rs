//! Replay memory and learner interfaces

use crate::{Result, Transition};

/// Write side of an experience replay store.
///
/// Stores are shared between the acting loop and a learner, so `add` takes
/// `&self` and implementations synchronise internally. Each `add` must be
/// atomic and ordered after earlier `add` calls from the same caller.
pub trait ReplayMemory: Send + Sync {
    /// Append one transition, evicting per the store's policy when full
    fn add(&self, transition: Transition) -> Result<()>;

    /// Number of stored transitions
    ///
    /// Infallible; a store that cannot be read reports zero and logs why.
    fn len(&self) -> usize;

    /// Maximum number of stored transitions
    fn capacity(&self) -> usize;

    /// Whether the store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Learning step driven by the agent once warm-up has passed
pub trait Learner: Send {
    /// Run one optimisation update
    fn update(&mut self) -> Result<()>;
}

/// Learner that never trains, for evaluation-only agents
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLearner;

impl Learner for NoopLearner {
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}
