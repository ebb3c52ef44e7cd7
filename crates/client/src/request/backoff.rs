// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with additive jitter.
//!
//! Delay before retry `n` (1-based):
//!
//! ```text
//! min(base * 2^(n-1) + jitter * u, cap)      u in [0, 1)
//! ```

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform randomness in `[0, 1)` for jitter.
pub trait JitterSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Jitter from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn next_unit(&self) -> f64 {
        rand::rng().random()
    }
}

/// Reproducible jitter from a seeded generator.
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        SeededJitter {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl JitterSource for SeededJitter {
    fn next_unit(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .random()
    }
}

/// Jitter source that always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before the first retry, doubled for each further retry.
    pub base: Duration,
    /// Upper bound of the random amount added to each delay.
    pub jitter: Duration,
    /// Maximum delay, applied after jitter.
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            base: Duration::from_millis(1_000),
            jitter: Duration::from_millis(1_000),
            cap: Duration::from_millis(10_000),
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry `attempt` (1-based). Attempt 0 has no delay.
    pub fn delay_for_attempt(&self, attempt: u32, jitter: &dyn JitterSource) -> Duration {
        self.delay_with_unit(attempt, jitter.next_unit())
    }

    /// Delay with an explicit jitter sample.
    pub fn delay_with_unit(&self, attempt: u32, unit: f64) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = (attempt - 1).min(31);
        let exponential = self.base.saturating_mul(1u32 << exponent);
        let unit = if unit.is_finite() {
            unit.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let jitter = self.jitter.mul_f64(unit);

        exponential.saturating_add(jitter).min(self.cap)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
