//! Action-value estimator interface

use ndarray::{ArrayD, ArrayView3};
use std::time::Instant;

/// What an estimator returns for one stacked observation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatorOutput {
    /// One value per action
    pub action_values: Vec<f32>,
    /// Auxiliary internal representations, in the order the estimator emits them
    pub representations: Vec<ArrayD<f32>>,
}

impl EstimatorOutput {
    /// Output with action values only
    #[must_use]
    pub fn from_values(action_values: Vec<f32>) -> Self {
        Self {
            action_values,
            representations: Vec::new(),
        }
    }
}

/// Action value function Q(s, ·) over a stacked grayscale observation.
///
/// `stack` is shaped `(height, width, depth)` with channel 0 the oldest frame.
/// Implementations must not run past `deadline`; when they cannot finish in
/// time they return [`AgentError::EstimatorTimeout`](crate::AgentError::EstimatorTimeout).
pub trait ValueEstimator: Send + Sync {
    /// Estimate the value of every action
    fn evaluate(
        &self,
        stack: ArrayView3<'_, u8>,
        deadline: Instant,
    ) -> crate::Result<EstimatorOutput>;
}

impl<E: ValueEstimator + ?Sized> ValueEstimator for Box<E> {
    fn evaluate(
        &self,
        stack: ArrayView3<'_, u8>,
        deadline: Instant,
    ) -> crate::Result<EstimatorOutput> {
        (**self).evaluate(stack, deadline)
    }
}

impl<E: ValueEstimator + ?Sized> ValueEstimator for std::sync::Arc<E> {
    fn evaluate(
        &self,
        stack: ArrayView3<'_, u8>,
        deadline: Instant,
    ) -> crate::Result<EstimatorOutput> {
        (**self).evaluate(stack, deadline)
    }
}
