//! Episode bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One episode as seen by the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ID
    pub id: Uuid,
    /// Whether the agent was evaluating when the episode started
    pub testing: bool,
    /// Number of `step` calls
    pub steps: u64,
    /// Sum of raw (unclipped) rewards
    pub total_reward: i64,
    /// Start time
    pub start_time: DateTime<Utc>,
    /// End time
    pub end_time: Option<DateTime<Utc>>,
}

impl Episode {
    fn begin(testing: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            testing,
            steps: 0,
            total_reward: 0,
            start_time: Utc::now(),
            end_time: None,
        }
    }
}

/// Tracks the running episode and the last finished one
#[derive(Debug, Clone)]
pub struct EpisodeTracker {
    current: Episode,
    last: Option<Episode>,
    completed: u64,
}

impl EpisodeTracker {
    /// Start tracking with a fresh episode
    #[must_use]
    pub fn new(testing: bool) -> Self {
        Self {
            current: Episode::begin(testing),
            last: None,
            completed: 0,
        }
    }

    /// Count one step and its reward
    pub fn record_step(&mut self, reward: i64) {
        self.current.steps += 1;
        self.current.total_reward = self.current.total_reward.saturating_add(reward);
    }

    /// Close the running episode and open a new one
    pub fn finish(&mut self, testing_next: bool) -> &Episode {
        let mut done = std::mem::replace(&mut self.current, Episode::begin(testing_next));
        done.end_time = Some(Utc::now());
        self.completed += 1;
        self.last.insert(done)
    }

    /// Running episode
    #[must_use]
    pub fn current(&self) -> &Episode {
        &self.current
    }

    /// Most recently finished episode
    #[must_use]
    pub fn last(&self) -> Option<&Episode> {
        self.last.as_ref()
    }

    /// Episodes finished so far
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }
}
