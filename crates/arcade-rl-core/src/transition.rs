//! Replay transitions and reward clipping

use serde::{Deserialize, Serialize};

use crate::{blank_frame, Frame, FrameSize};

/// Saturate a raw game reward to `{-1, 0, 1}`
#[must_use]
pub fn clip_reward(reward: i64) -> i8 {
    // clamp keeps the value inside i8 range
    reward.clamp(-1, 1) as i8
}

/// Single recorded step, as written to replay memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Single observed frame (not the whole stack)
    pub frame: Frame,
    /// Action taken from that frame
    pub action: usize,
    /// Clipped reward
    pub reward: i8,
    /// Whether the episode ended here
    pub terminal: bool,
}

impl Transition {
    /// Create a transition, clipping the reward
    #[must_use]
    pub fn new(frame: Frame, action: usize, reward: i64, terminal: bool) -> Self {
        Self {
            frame,
            action,
            reward: clip_reward(reward),
            terminal,
        }
    }

    /// Blank episode-start padding entry
    #[must_use]
    pub fn padding(size: FrameSize) -> Self {
        Self {
            frame: blank_frame(size),
            action: 0,
            reward: 0,
            terminal: false,
        }
    }

    /// Whether this is a padding entry
    #[must_use]
    pub fn is_padding(&self) -> bool {
        self.action == 0 && self.reward == 0 && !self.terminal && self.frame.iter().all(|&p| p == 0)
    }
}
