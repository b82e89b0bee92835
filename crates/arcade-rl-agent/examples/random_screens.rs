//! Example: Driving the agent loop with random screens
//!
//! Run with `RUST_LOG=arcade_rl_agent=debug` to see per-step decisions.

use std::sync::Arc;
use std::time::Instant;

use arcade_rl_agent::{Agent, Boltzmann, DeadlineEstimator, ReplayBuffer};
use arcade_rl_core::{
    AgentConfig, EstimatorOutput, FrameSize, NoopLearner, ReplayMemory, Result, ValueEstimator,
};
use ndarray::{Array3, ArrayView3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

/// Scores each action by the brightness of one vertical band of the newest frame
struct BrightnessEstimator {
    actions: usize,
}

impl ValueEstimator for BrightnessEstimator {
    fn evaluate(&self, stack: ArrayView3<'_, u8>, _deadline: Instant) -> Result<EstimatorOutput> {
        let newest = stack.index_axis(Axis(2), stack.len_of(Axis(2)) - 1);
        let band = (newest.ncols() / self.actions).max(1);
        let values = (0..self.actions)
            .map(|a| {
                let start = (a * band).min(newest.ncols() - 1);
                let end = (start + band).min(newest.ncols());
                let column = newest.slice(ndarray::s![.., start..end]);
                column.iter().map(|&p| f32::from(p)).sum::<f32>() / column.len() as f32
            })
            .collect();
        Ok(EstimatorOutput::from_values(values))
    }
}

fn random_screen(rng: &mut StdRng) -> Array3<u8> {
    Array3::from_shape_fn((210, 160, 3), |_| rng.gen())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AgentConfig {
        frame_size: FrameSize::new(84, 84),
        action_count: 6,
        exploration_steps: 500,
        steps_before_training: 100,
        seed: Some(42),
        ..AgentConfig::default()
    };
    let actions = config.action_count;

    let replay = Arc::new(ReplayBuffer::new(10_000));
    let estimator = DeadlineEstimator::new(BrightnessEstimator { actions });
    let mut agent = Agent::new(config, Box::new(estimator), Box::new(NoopLearner), replay.clone())?;
    agent.register_action_mode("boltzmann", Box::new(Boltzmann::new(10.0)));

    let mut rng = StdRng::seed_from_u64(7);

    // Training episodes
    for _ in 0..5 {
        let length = rng.gen_range(50..150);
        for _ in 0..length {
            let reward = rng.gen_range(-3..=3);
            agent.step(random_screen(&mut rng).view(), reward)?;
        }
        agent.terminal()?;
        if let Some(episode) = agent.last_episode() {
            println!(
                "Training episode: steps = {}, total reward = {}, epsilon now {:.3}",
                episode.steps,
                episode.total_reward,
                agent.epsilon()
            );
        }
    }

    // Evaluation episode with the softmax mode
    agent.set_testing(true);
    agent.set_action_mode("boltzmann")?;
    let stored = replay.len();
    for _ in 0..100 {
        agent.step(random_screen(&mut rng).view(), 0)?;
    }
    agent.terminal()?;

    println!("\nStep count: {}", agent.step_count());
    println!("Replay size: {} (unchanged by evaluation: {})", replay.len(), replay.len() == stored);
    if let Some(episode) = agent.last_episode() {
        println!("Last episode: {}", serde_json::to_string_pretty(episode)?);
    }

    Ok(())
}
