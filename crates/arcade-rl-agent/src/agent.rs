//! The observation/action/replay loop

use ndarray::{ArrayD, ArrayView3};
use std::sync::Arc;
use tracing::{debug, info};

use arcade_rl_core::{
    AgentConfig, ExplorationSchedule, FrameBuffer, GrayscaleResize, Learner, Perception,
    ReplayMemory, Result, ValueEstimator,
};

use crate::episode::{Episode, EpisodeTracker};
use crate::policy::{ActionMode, ActionSelector, Phase};
use crate::recorder::ReplayRecorder;

/// Previous step's decision, written to replay one step late
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Latch {
    action: usize,
    reward: i64,
}

/// Frame-stacking, epsilon-greedy agent driving an external estimator and learner.
///
/// The driving loop calls [`Agent::step`] with each raw screen and the reward
/// that led to it, and [`Agent::terminal`] when an episode ends. While
/// training, every step first writes the *previous* frame together with the
/// previous action and reward to replay, so a transition pairs the newest
/// stacked frame before the push with the decision taken from it.
///
/// Perception and estimator failures abort a step before any state changes;
/// the frame stack, latch, step counter and replay store stay as they were.
/// A learner failure is returned after the replay write and push, but the
/// step counter is not advanced.
pub struct Agent {
    config: AgentConfig,
    frames: FrameBuffer,
    schedule: ExplorationSchedule,
    selector: ActionSelector,
    recorder: ReplayRecorder,
    estimator: Box<dyn ValueEstimator>,
    learner: Box<dyn Learner>,
    perception: Box<dyn Perception>,
    step_count: u64,
    latch: Latch,
    testing: bool,
    episodes: EpisodeTracker,
}

impl Agent {
    /// Create a training agent and write the first episode's padding
    pub fn new(
        config: AgentConfig,
        estimator: Box<dyn ValueEstimator>,
        learner: Box<dyn Learner>,
        replay: Arc<dyn ReplayMemory>,
    ) -> Result<Self> {
        config.validate()?;

        let mut agent = Self {
            frames: FrameBuffer::new(config.buffer_depth, config.frame_size),
            schedule: ExplorationSchedule::from_config(&config),
            selector: ActionSelector::new(config.action_count, config.testing_epsilon, config.seed),
            recorder: ReplayRecorder::new(replay, config.buffer_depth, config.frame_size),
            estimator,
            learner,
            perception: Box::new(GrayscaleResize::new(config.frame_size)),
            step_count: 0,
            latch: Latch::default(),
            testing: false,
            episodes: EpisodeTracker::new(false),
            config,
        };
        agent.reset_episode()?;
        info!(
            depth = agent.config.buffer_depth,
            actions = agent.config.action_count,
            mode = %agent.selector.active_mode(),
            "agent ready"
        );
        Ok(agent)
    }

    /// Replace the default grayscale/resize transform
    #[must_use]
    pub fn with_perception(mut self, perception: Box<dyn Perception>) -> Self {
        self.perception = perception;
        self
    }

    /// Observe a screen and the reward for reaching it; returns the next action
    pub fn step(&mut self, screen: ArrayView3<'_, u8>, reward: i64) -> Result<usize> {
        let frame = self.perception.to_canonical_gray(screen)?;
        let stack = self.frames.stacked_with(frame.view())?;
        let timeout = self.config.estimator_timeout();

        if self.testing {
            let epsilon = self.schedule.testing_epsilon();
            let action = self.selector.select(
                self.estimator.as_ref(),
                stack.view(),
                epsilon,
                Phase::Evaluation,
                timeout,
            )?;
            self.frames.push(frame.view())?;
            self.latch = Latch { action, reward };
            self.episodes.record_step(reward);
            return Ok(action);
        }

        let epsilon = self.schedule.epsilon(self.step_count);
        let action = self.selector.select(
            self.estimator.as_ref(),
            stack.view(),
            epsilon,
            Phase::Training,
            timeout,
        )?;

        self.recorder
            .add(self.frames.latest(), self.latch.action, self.latch.reward, false)?;
        self.frames.push(frame.view())?;

        self.latch = Latch { action, reward };

        // a failed update leaves the step uncounted
        if self.step_count > self.config.steps_before_training {
            self.learner.update()?;
            metrics::increment_counter!("arcade_agent_updates_total");
        }

        self.step_count += 1;
        self.episodes.record_step(reward);

        metrics::increment_counter!("arcade_agent_steps_total");
        metrics::gauge!("arcade_agent_epsilon", epsilon);
        Ok(action)
    }

    /// End the episode: record the terminal transition and reset the stack
    pub fn terminal(&mut self) -> Result<()> {
        if !self.testing {
            self.recorder
                .add(self.frames.latest(), self.latch.action, self.latch.reward, true)?;
        }

        let episode = self.episodes.finish(self.testing);
        info!(
            episode = %episode.id,
            steps = episode.steps,
            total_reward = episode.total_reward,
            testing = episode.testing,
            "episode finished"
        );
        metrics::increment_counter!("arcade_agent_episodes_total");

        self.reset_episode()
    }

    fn reset_episode(&mut self) -> Result<()> {
        self.frames.reset();
        self.latch = Latch::default();
        if !self.testing {
            self.recorder.pad_episode_start()?;
        }
        Ok(())
    }

    /// Switch between training and evaluation; applies from the next call
    pub fn set_testing(&mut self, testing: bool) {
        if self.testing != testing {
            info!(testing, step_count = self.step_count, "agent mode changed");
        }
        self.testing = testing;
    }

    /// Select the action mode used while evaluating
    pub fn set_action_mode(&mut self, name: &str) -> Result<()> {
        self.selector.set_mode(name)
    }

    /// Make an additional action mode available
    pub fn register_action_mode(&mut self, name: impl Into<String>, mode: Box<dyn ActionMode>) {
        self.selector.register(name, mode);
    }

    /// Active action mode
    #[must_use]
    pub fn action_mode(&self) -> &str {
        self.selector.active_mode()
    }

    /// Registered action modes, default first
    pub fn action_modes(&self) -> impl Iterator<Item = &str> {
        self.selector.modes()
    }

    /// Whether the agent is evaluating
    #[must_use]
    pub fn is_testing(&self) -> bool {
        self.testing
    }

    /// Training steps taken so far
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Epsilon the next step will use
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        if self.testing {
            self.schedule.testing_epsilon()
        } else {
            self.schedule.epsilon(self.step_count)
        }
    }

    /// Auxiliary estimator outputs from the last decision
    #[must_use]
    pub fn representations(&self) -> &[ArrayD<f32>] {
        self.selector.representations()
    }

    /// Current frame stack
    #[must_use]
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frames
    }

    /// Running episode
    #[must_use]
    pub fn episode(&self) -> &Episode {
        self.episodes.current()
    }

    /// Most recently finished episode
    #[must_use]
    pub fn last_episode(&self) -> Option<&Episode> {
        self.episodes.last()
    }

    /// Episodes finished so far
    #[must_use]
    pub fn episodes_completed(&self) -> u64 {
        self.episodes.completed()
    }

    /// Replay store the agent writes to
    #[must_use]
    pub fn replay(&self) -> &Arc<dyn ReplayMemory> {
        self.recorder.replay()
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("step_count", &self.step_count)
            .field("testing", &self.testing)
            .field("selector", &self.selector)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        debug!(
            step_count = self.step_count,
            episodes = self.episodes.completed(),
            "agent dropped"
        );
    }
}
