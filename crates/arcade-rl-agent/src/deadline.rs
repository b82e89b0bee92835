//! Deadline enforcement for blocking estimators

use ndarray::ArrayView3;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::warn;

use arcade_rl_core::{AgentError, EstimatorOutput, Result, ValueEstimator};

/// Runs a blocking estimator on a worker thread and stops waiting at the deadline.
///
/// For estimators that cannot observe a deadline themselves. A call that
/// overruns returns [`AgentError::EstimatorTimeout`]; its worker thread is
/// left to finish and its answer is discarded.
pub struct DeadlineEstimator<E> {
    inner: Arc<E>,
}

impl<E> DeadlineEstimator<E>
where
    E: ValueEstimator + 'static,
{
    /// Wrap an estimator
    pub fn new(inner: E) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Wrap an estimator that is already shared, e.g. with a learner
    pub fn from_shared(inner: Arc<E>) -> Self {
        Self { inner }
    }

    /// Wrapped estimator
    pub fn inner(&self) -> &Arc<E> {
        &self.inner
    }
}

impl<E> ValueEstimator for DeadlineEstimator<E>
where
    E: ValueEstimator + 'static,
{
    fn evaluate(&self, stack: ArrayView3<'_, u8>, deadline: Instant) -> Result<EstimatorOutput> {
        let started = Instant::now();
        let budget = deadline.saturating_duration_since(started);
        let timeout_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);

        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let stack = stack.to_owned();

        thread::Builder::new()
            .name("estimator".into())
            .spawn(move || {
                let result = inner.evaluate(stack.view(), deadline);
                let _ = tx.send(result);
            })
            .map_err(AgentError::Io)?;

        match rx.recv_timeout(budget) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(timeout_ms, "estimator worker overran its deadline");
                Err(AgentError::EstimatorTimeout { timeout_ms })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(AgentError::Estimator(
                "estimator worker exited without answering".into(),
            )),
        }
    }
}
