//! Decides whether a run does anything at all.
//!
//! Skipping some scheduled runs keeps the commit history from looking like
//! clockwork. It has no bearing on correctness.

use rand::Rng;

pub trait SkipPolicy {
    fn should_skip(&self) -> bool;
}

/// Skip with a fixed probability per run.
#[derive(Debug, Clone, Copy)]
pub struct RandomSkip {
    probability: f64,
}

impl RandomSkip {
    /// `probability` is clamped into `[0, 1]`; NaN means never.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }
}

impl SkipPolicy for RandomSkip {
    fn should_skip(&self) -> bool {
        if self.probability <= 0.0 {
            return false;
        }
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Always the same answer. Used when skipping is disabled, and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSkip(pub bool);

impl SkipPolicy for FixedSkip {
    fn should_skip(&self) -> bool {
        self.0
    }
}
