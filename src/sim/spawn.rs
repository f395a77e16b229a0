//! Spawn queue: the single "on deck" slot
//!
//! Holds the tier that will be fired next and the post-shot cooldown lock.
//! The cooldown is time-based state polled every tick, never a blocking wait.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct SpawnQueue {
    pending: usize,
    /// Draws come from tiers `0..spawn_tiers`
    spawn_tiers: usize,
    /// Real-time instant (ms) at which the lock lifts
    unlock_at: Option<f64>,
    draws: u64,
    rng: Pcg32,
}

impl SpawnQueue {
    pub fn new(seed: u64, spawn_tiers: usize) -> Self {
        let mut queue = Self {
            pending: 0,
            spawn_tiers: spawn_tiers.max(1),
            unlock_at: None,
            draws: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        queue.advance();
        queue
    }

    /// Current pending tier; stable until `advance`
    #[inline]
    pub fn peek(&self) -> usize {
        self.pending
    }

    /// Draw a fresh pending tier
    pub fn advance(&mut self) -> usize {
        self.pending = self.rng.random_range(0..self.spawn_tiers);
        self.draws += 1;
        self.pending
    }

    /// Number of draws made so far, including the initial one
    pub fn draws(&self) -> u64 {
        self.draws
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.unlock_at.is_some()
    }

    /// Lock until `unlock_at`; relocking while locked is ignored
    pub fn lock(&mut self, unlock_at: f64) {
        if self.unlock_at.is_none() {
            self.unlock_at = Some(unlock_at);
        }
    }

    /// Lift an elapsed lock, advancing exactly once per shot
    ///
    /// Returns the new pending tier when the lock was lifted.
    pub fn poll(&mut self, now_ms: f64) -> Option<usize> {
        match self.unlock_at {
            Some(at) if now_ms >= at => {
                self.unlock_at = None;
                Some(self.advance())
            }
            _ => None,
        }
    }
}
