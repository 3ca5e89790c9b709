//! Step generators for the bounded random walk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of per-tick step proposals.
///
/// Implementations may propose any value; the sensor clamps the step to
/// `[-bound, bound]` and the result to the configured range.
pub trait StepSource: Send {
    fn next_step(&mut self, bound: i32) -> i32;
}

/// Uniformly random steps in `[-bound, bound]`.
pub struct RandomSteps {
    rng: StdRng,
}

impl RandomSteps {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible steps for simulations that need a fixed sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSteps {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSource for RandomSteps {
    fn next_step(&mut self, bound: i32) -> i32 {
        self.rng.gen_range(-bound..=bound)
    }
}

/// Replays a fixed list of steps, then proposes 0 forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSteps {
    steps: VecDeque<i32>,
}

impl ScriptedSteps {
    pub fn new(steps: impl IntoIterator<Item = i32>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

impl StepSource for ScriptedSteps {
    fn next_step(&mut self, _bound: i32) -> i32 {
        self.steps.pop_front().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_steps_stay_within_bound() {
        let mut steps = RandomSteps::seeded(7);
        for _ in 0..1_000 {
            let step = steps.next_step(3);
            assert!((-3..=3).contains(&step), "step {} out of bound", step);
        }
        assert_eq!(steps.next_step(0), 0);
    }

    #[test]
    fn test_seeded_steps_are_reproducible() {
        let mut a = RandomSteps::seeded(42);
        let mut b = RandomSteps::seeded(42);
        let left: Vec<i32> = (0..20).map(|_| a.next_step(5)).collect();
        let right: Vec<i32> = (0..20).map(|_| b.next_step(5)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_scripted_steps_then_zero() {
        let mut steps = ScriptedSteps::new([1, -2]);
        assert_eq!(steps.next_step(2), 1);
        assert_eq!(steps.next_step(2), -2);
        assert_eq!(steps.next_step(2), 0);
    }
}
