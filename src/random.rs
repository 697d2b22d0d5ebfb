//! Random source capability.
//!
//! Treated as an external collaborator producing uniform floats in `[0,1)`
//! and random phases in `[0,2π)`. The default implementation calls
//! `rand::random`, the same call site style the teacher uses for per-agent
//! jitter in `tensor_engine.rs`. `SeededRandomSource` lets callers inject a
//! reproducible source for tests.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

pub trait RandomSource: Send + Sync {
    /// Uniform float in `[0,1)`.
    fn uniform(&self) -> f64;

    /// Uniform phase in `[0,2π)`.
    fn phase(&self) -> f64 {
        self.uniform() * TAU
    }

    /// True with probability `p`, clamped to `[0,1]`.
    fn bernoulli(&self, p: f64) -> bool {
        self.uniform() < p.clamp(0.0, 1.0)
    }
}

/// Default OS-backed random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRandomSource;

impl RandomSource for DefaultRandomSource {
    fn uniform(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Deterministic random source for reproducible tests and simulations.
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        SeededRandomSource {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn uniform(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}
