//! Action selection strategies and the named action-mode registry

use indexmap::IndexMap;
use ndarray::{ArrayD, ArrayView3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, WeightedIndex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use arcade_rl_core::{AgentError, Result, ValueEstimator};

/// A way of turning action values into an action
pub trait ActionMode: Send + Sync {
    /// Pick an action index in `[0, action_values.len())`
    fn select(&self, epsilon: f64, action_values: &[f32], rng: &mut dyn RngCore) -> Result<usize>;
}

/// Index of the first maximum; NaN values never win
#[must_use]
pub fn greedy_action(action_values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in action_values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

fn greedy_or_err(action_values: &[f32]) -> Result<usize> {
    greedy_action(action_values)
        .ok_or_else(|| AgentError::Estimator("no comparable action value".into()))
}

/// Greedy action, replaced by a uniform random one with probability epsilon
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsilonGreedy;

impl ActionMode for EpsilonGreedy {
    fn select(&self, epsilon: f64, action_values: &[f32], rng: &mut dyn RngCore) -> Result<usize> {
        let mut action = greedy_or_err(action_values)?;
        if rng.gen::<f64>() < epsilon {
            action = rng.gen_range(0..action_values.len());
        }
        Ok(action)
    }
}

/// Softmax sampling over action values; epsilon is not used
#[derive(Debug, Clone, Copy)]
pub struct Boltzmann {
    /// Softmax temperature, higher is more uniform
    pub temperature: f64,
}

impl Boltzmann {
    /// Create a Boltzmann strategy
    #[must_use]
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }
}

impl ActionMode for Boltzmann {
    fn select(&self, _epsilon: f64, action_values: &[f32], rng: &mut dyn RngCore) -> Result<usize> {
        let greedy = greedy_or_err(action_values)?;
        if self.temperature <= 0.0 {
            return Ok(greedy);
        }

        let max = f64::from(action_values[greedy]);
        let weights: Vec<f64> = action_values
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    0.0
                } else {
                    ((f64::from(v) - max) / self.temperature).exp()
                }
            })
            .collect();

        match WeightedIndex::new(&weights) {
            Ok(dist) => Ok(dist.sample(rng)),
            Err(_) => Ok(greedy),
        }
    }
}

/// Which strategy a selection should go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Epsilon-greedy with the annealed epsilon
    Training,
    /// The active registered mode with the testing epsilon
    Evaluation,
}

/// Queries the estimator and applies an action-selection strategy.
///
/// Holds the action-mode registry. The first entry, keyed by the testing
/// epsilon (e.g. `"0.01_greedy"`), is the default and is always present.
pub struct ActionSelector {
    modes: IndexMap<String, Box<dyn ActionMode>>,
    active: String,
    training: EpsilonGreedy,
    action_count: usize,
    representations: Vec<ArrayD<f32>>,
    rng: StdRng,
}

impl ActionSelector {
    /// Create a selector with the default epsilon-greedy mode registered
    #[must_use]
    pub fn new(action_count: usize, testing_epsilon: f64, seed: Option<u64>) -> Self {
        let default = Self::default_mode_name(testing_epsilon);
        let mut modes: IndexMap<String, Box<dyn ActionMode>> = IndexMap::new();
        modes.insert(default.clone(), Box::new(EpsilonGreedy));

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            modes,
            active: default,
            training: EpsilonGreedy,
            action_count,
            representations: Vec::new(),
            rng,
        }
    }

    /// Registry key of the default mode for a testing epsilon
    #[must_use]
    pub fn default_mode_name(testing_epsilon: f64) -> String {
        format!("{testing_epsilon:?}_greedy")
    }

    /// Add a named strategy; an existing entry with the same name is replaced
    pub fn register(&mut self, name: impl Into<String>, mode: Box<dyn ActionMode>) {
        let name = name.into();
        debug!(mode = %name, "registered action mode");
        self.modes.insert(name, mode);
    }

    /// Switch the strategy used in evaluation
    pub fn set_mode(&mut self, name: &str) -> Result<()> {
        if !self.modes.contains_key(name) {
            return Err(AgentError::InvalidMode(name.to_string()));
        }
        info!(from = %self.active, to = %name, "switching action mode");
        self.active = name.to_string();
        Ok(())
    }

    /// Name of the active strategy
    #[must_use]
    pub fn active_mode(&self) -> &str {
        &self.active
    }

    /// Name of the default strategy
    #[must_use]
    pub fn default_mode(&self) -> &str {
        self.modes.get_index(0).map_or("", |(name, _)| name.as_str())
    }

    /// Registered mode names in registration order
    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    /// Auxiliary estimator outputs from the last successful selection
    #[must_use]
    pub fn representations(&self) -> &[ArrayD<f32>] {
        &self.representations
    }

    /// Query the estimator for `stack` and choose an action.
    ///
    /// Nothing is cached unless the estimator answers in time with one value
    /// per action.
    pub fn select(
        &mut self,
        estimator: &dyn ValueEstimator,
        stack: ArrayView3<'_, u8>,
        epsilon: f64,
        phase: Phase,
        timeout: Duration,
    ) -> Result<usize> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let deadline = Instant::now() + timeout;

        let output = match estimator.evaluate(stack, deadline) {
            Ok(_) if Instant::now() > deadline => Err(AgentError::EstimatorTimeout { timeout_ms }),
            other => other,
        }
        .map_err(|err| {
            if err.is_timeout() {
                warn!(timeout_ms, "value estimation exceeded its deadline");
            }
            err
        })?;

        if output.action_values.len() != self.action_count {
            return Err(AgentError::DimensionMismatch {
                expected: self.action_count,
                actual: output.action_values.len(),
            });
        }

        let action = match phase {
            Phase::Training => self.training.select(epsilon, &output.action_values, &mut self.rng)?,
            Phase::Evaluation => {
                let mode = self
                    .modes
                    .get(&self.active)
                    .ok_or_else(|| AgentError::InvalidMode(self.active.clone()))?;
                mode.select(epsilon, &output.action_values, &mut self.rng)?
            }
        };

        self.representations = output.representations;
        debug!(action, epsilon, ?phase, "selected action");
        Ok(action)
    }
}

impl std::fmt::Debug for ActionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSelector")
            .field("modes", &self.modes.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("action_count", &self.action_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_rl_core::EstimatorOutput;
    use ndarray::{Array3, IxDyn};

    struct Fixed(Vec<f32>);

    impl ValueEstimator for Fixed {
        fn evaluate(
            &self,
            _stack: ArrayView3<'_, u8>,
            _deadline: Instant,
        ) -> Result<EstimatorOutput> {
            Ok(EstimatorOutput {
                action_values: self.0.clone(),
                representations: vec![ArrayD::from_elem(IxDyn(&[2, 3]), 0.5)],
            })
        }
    }

    struct Late;

    impl ValueEstimator for Late {
        fn evaluate(
            &self,
            _stack: ArrayView3<'_, u8>,
            _deadline: Instant,
        ) -> Result<EstimatorOutput> {
            std::thread::sleep(Duration::from_millis(30));
            Ok(EstimatorOutput::from_values(vec![0.0; 3]))
        }
    }

    fn stack() -> Array3<u8> {
        Array3::zeros((2, 2, 4))
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        assert_eq!(greedy_action(&[0.1, 0.7, 0.3, 0.7]), Some(1));
        assert_eq!(greedy_action(&[2.0, 2.0]), Some(0));
        assert_eq!(greedy_action(&[f32::NAN, 1.0, 1.0]), Some(1));
        assert_eq!(greedy_action(&[f32::NAN]), None);
        assert_eq!(greedy_action(&[]), None);
    }

    #[test]
    fn test_zero_epsilon_is_greedy() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let action = EpsilonGreedy.select(0.0, &[0.0, 5.0, 5.0, 1.0], &mut rng).unwrap();
            assert_eq!(action, 1);
        }
    }

    #[test]
    fn test_full_epsilon_covers_all_actions() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let action = EpsilonGreedy.select(1.0, &[0.0, 9.0, 0.0, 0.0], &mut rng).unwrap();
            seen[action] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_boltzmann_prefers_high_values() {
        let mut rng = StdRng::seed_from_u64(5);
        let mode = Boltzmann::new(0.5);
        let mut counts = [0usize; 3];
        for _ in 0..1_000 {
            counts[mode.select(0.0, &[0.0, 3.0, 0.0], &mut rng).unwrap()] += 1;
        }
        assert!(counts[1] > counts[0] + counts[2]);

        let greedy = Boltzmann::new(0.0);
        assert_eq!(greedy.select(0.0, &[0.0, 3.0, 0.0], &mut rng).unwrap(), 1);
    }

    #[test]
    fn test_default_mode_named_after_testing_epsilon() {
        let selector = ActionSelector::new(4, 0.05, Some(0));
        assert_eq!(selector.default_mode(), "0.05_greedy");
        assert_eq!(selector.active_mode(), "0.05_greedy");
        assert_eq!(selector.modes().count(), 1);
    }

    #[test]
    fn test_whole_number_epsilon_keeps_decimal_point() {
        assert_eq!(ActionSelector::default_mode_name(1.0), "1.0_greedy");
        assert_eq!(ActionSelector::default_mode_name(0.0), "0.0_greedy");
        assert_eq!(ActionSelector::default_mode_name(0.01), "0.01_greedy");
    }

    #[test]
    fn test_unknown_mode_keeps_active() {
        let mut selector = ActionSelector::new(4, 0.01, Some(0));
        selector.register("soft", Box::new(Boltzmann::new(1.0)));

        let err = selector.set_mode("nonexistent").unwrap_err();
        assert!(matches!(err, AgentError::InvalidMode(ref name) if name == "nonexistent"));
        assert_eq!(selector.active_mode(), "0.01_greedy");

        selector.set_mode("soft").unwrap();
        assert_eq!(selector.active_mode(), "soft");
        assert_eq!(selector.default_mode(), "0.01_greedy");
    }

    #[test]
    fn test_select_caches_representations() {
        let mut selector = ActionSelector::new(4, 0.01, Some(1));
        let estimator = Fixed(vec![0.0, 0.0, 1.0, 0.0]);
        let action = selector
            .select(&estimator, stack().view(), 0.0, Phase::Training, Duration::from_secs(1))
            .unwrap();

        assert_eq!(action, 2);
        assert_eq!(selector.representations().len(), 1);
        assert_eq!(selector.representations()[0].shape(), &[2, 3]);
    }

    #[test]
    fn test_wrong_value_count_is_rejected() {
        let mut selector = ActionSelector::new(4, 0.01, Some(1));
        let err = selector
            .select(
                &Fixed(vec![1.0, 2.0]),
                stack().view(),
                0.0,
                Phase::Evaluation,
                Duration::from_secs(1),
            )
            .unwrap_err();
        assert!(matches!(err, AgentError::DimensionMismatch { expected: 4, actual: 2 }));
        assert!(selector.representations().is_empty());
    }

    #[test]
    fn test_late_answer_counts_as_timeout() {
        let mut selector = ActionSelector::new(3, 0.01, Some(1));
        let err = selector
            .select(&Late, stack().view(), 0.0, Phase::Training, Duration::from_millis(5))
            .unwrap_err();
        assert!(matches!(err, AgentError::EstimatorTimeout { timeout_ms: 5 }));
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let estimator = Fixed(vec![0.0; 4]);
        let run = |seed| {
            let mut selector = ActionSelector::new(4, 0.01, Some(seed));
            (0..20)
                .map(|_| {
                    selector
                        .select(
                            &estimator,
                            stack().view(),
                            1.0,
                            Phase::Training,
                            Duration::from_secs(1),
                        )
                        .unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
