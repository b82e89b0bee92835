//! Writes agent transitions into replay memory

use ndarray::ArrayView2;
use std::sync::Arc;

use arcade_rl_core::{FrameSize, ReplayMemory, Result, Transition};

/// Forwards single-frame transitions to a replay store.
///
/// Rewards are clipped to `{-1, 0, 1}` on the way in. At every training
/// episode start `depth - 1` blank transitions are written so that stacks
/// sampled near the start of an episode are padded with empty screens rather
/// than frames from the previous episode.
pub struct ReplayRecorder {
    replay: Arc<dyn ReplayMemory>,
    depth: usize,
    frame_size: FrameSize,
}

impl ReplayRecorder {
    /// Create a recorder for stacks of `depth` frames
    pub fn new(replay: Arc<dyn ReplayMemory>, depth: usize, frame_size: FrameSize) -> Self {
        Self {
            replay,
            depth,
            frame_size,
        }
    }

    /// Record one transition
    pub fn add(
        &self,
        frame: ArrayView2<'_, u8>,
        action: usize,
        reward: i64,
        terminal: bool,
    ) -> Result<()> {
        self.replay
            .add(Transition::new(frame.to_owned(), action, reward, terminal))?;
        metrics::increment_counter!("arcade_agent_transitions_total");
        Ok(())
    }

    /// Write the blank episode-start padding
    pub fn pad_episode_start(&self) -> Result<()> {
        for _ in 1..self.depth {
            self.replay.add(Transition::padding(self.frame_size))?;
        }
        metrics::counter!("arcade_agent_padding_transitions_total", self.padding_len() as u64);
        Ok(())
    }

    /// Number of padding transitions per episode start
    #[must_use]
    pub fn padding_len(&self) -> usize {
        self.depth.saturating_sub(1)
    }

    /// Underlying replay store
    #[must_use]
    pub fn replay(&self) -> &Arc<dyn ReplayMemory> {
        &self.replay
    }
}

impl std::fmt::Debug for ReplayRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayRecorder")
            .field("depth", &self.depth)
            .field("frame_size", &self.frame_size)
            .field("stored", &self.replay.len())
            .finish()
    }
}
