//! Seeded randomness for the simulation
//!
//! Every random draw in the engine goes through [`Dice`] so that two sessions
//! built from the same seed and fed the same commands evolve identically.
//! Tests can queue forced d20 results with [`Dice::rig`].

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::DIE_FACES;

/// Random source shared by every mode engine
#[derive(Debug, Clone)]
pub struct Dice {
    seed: u64,
    rng: Pcg32,
    /// Forced d20 results, consumed before the RNG is consulted
    rigged: VecDeque<u32>,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            rigged: VecDeque::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Queue d20 results to be returned (in order) by subsequent rolls
    pub fn rig(&mut self, rolls: impl IntoIterator<Item = u32>) {
        self.rigged
            .extend(rolls.into_iter().map(|r| r.clamp(1, DIE_FACES)));
    }

    /// Roll a d20 (1..=20)
    pub fn d20(&mut self) -> u32 {
        match self.rigged.pop_front() {
            Some(roll) => roll,
            None => self.rng.random_range(1..=DIE_FACES),
        }
    }

    /// Uniform draw in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform draw in [0, 100)
    pub fn percent(&mut self) -> f32 {
        self.unit() * 100.0
    }

    /// Uniform angle in [0, 2π)
    pub fn angle(&mut self) -> f32 {
        self.unit() * std::f32::consts::TAU
    }

    /// Uniform index into a collection of `len` items (`len` must be non-zero)
    pub fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}
