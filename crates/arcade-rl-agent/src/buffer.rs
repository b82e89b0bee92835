//! In-memory experience replay

use rand::seq::index;
use rand::Rng;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

use arcade_rl_core::{AgentError, ReplayMemory, Result, Transition};

/// Bounded replay store shared between acting and learning threads.
///
/// Transitions sit in a ring; once full, each `add` overwrites the oldest.
/// Writers take the write lock for a single slot assignment, so every `add`
/// is atomic and adds from one thread keep their order.
#[derive(Debug)]
pub struct ReplayBuffer {
    inner: RwLock<Ring>,
    capacity: usize,
}

#[derive(Debug)]
struct Ring {
    slots: Vec<Transition>,
    /// Next slot to write once full
    position: usize,
    /// Transitions ever written, including evicted ones
    written: u64,
}

impl ReplayBuffer {
    /// Create a new replay buffer
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        Self {
            inner: RwLock::new(Ring {
                slots: Vec::with_capacity(capacity),
                position: 0,
                written: 0,
            }),
            capacity,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ring>> {
        self.inner
            .read()
            .map_err(|_| AgentError::ReplayStore("replay lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ring>> {
        self.inner
            .write()
            .map_err(|_| AgentError::ReplayStore("replay lock poisoned".into()))
    }

    /// Sample a batch of distinct transitions uniformly
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Option<Vec<Transition>>> {
        let ring = self.read()?;
        if ring.slots.len() < batch_size {
            return Ok(None);
        }
        let batch = index::sample(rng, ring.slots.len(), batch_size)
            .iter()
            .map(|i| ring.slots[i].clone())
            .collect();
        Ok(Some(batch))
    }

    /// The `n` most recent transitions, oldest first
    pub fn recent(&self, n: usize) -> Result<Vec<Transition>> {
        let ring = self.read()?;
        let len = ring.slots.len();
        let n = n.min(len);
        // once full, `position` is the oldest slot
        let start = if len < self.capacity { 0 } else { ring.position };
        Ok((len - n..len)
            .map(|i| ring.slots[(start + i) % len].clone())
            .collect())
    }

    /// Every stored transition, oldest first
    pub fn snapshot(&self) -> Result<Vec<Transition>> {
        self.recent(self.capacity)
    }

    /// Total transitions ever added, evicted ones included
    pub fn total_written(&self) -> Result<u64> {
        Ok(self.read()?.written)
    }

    /// Drop every stored transition
    pub fn clear(&self) -> Result<()> {
        let mut ring = self.write()?;
        ring.slots.clear();
        ring.position = 0;
        Ok(())
    }
}

impl ReplayMemory for ReplayBuffer {
    fn add(&self, transition: Transition) -> Result<()> {
        let mut ring = self.write()?;
        if ring.slots.len() < self.capacity {
            ring.slots.push(transition);
        } else {
            let position = ring.position;
            ring.slots[position] = transition;
            ring.position = (position + 1) % self.capacity;
        }
        ring.written += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        match self.read() {
            Ok(ring) => ring.slots.len(),
            Err(err) => {
                warn!(%err, "reporting poisoned replay buffer as empty");
                0
            }
        }
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
