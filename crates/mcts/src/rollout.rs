//! Rollout (simulation) policies.
//!
//! A rollout estimates the value of a state by playing it out to a scalar
//! return. The default policy samples uniformly random legal actions; any
//! terminating policy can stand in for it.

use planner_core::{Environment, Result};
use rand::Rng;

/// Trait for estimating a state's value with a playout.
pub trait RolloutPolicy<E: Environment> {
    /// Play out from `start`, returning the accumulated reward.
    ///
    /// The environment's internal position is unspecified on entry; the
    /// policy re-enters it at `start` via `set_state` before stepping.
    ///
    /// # Errors
    /// Environment failures abort the rollout and propagate to the caller.
    fn rollout(&mut self, env: &mut E, start: &E::State) -> Result<f32>;
}

/// Uniform-random playout with a step cap.
///
/// Repeatedly samples a random legal action until the environment signals
/// termination, no legal action remains, or `max_steps` is reached. Hitting
/// the cap ends the rollout with whatever reward accumulated so far; it is
/// not an error.
pub struct RandomRollout<R: Rng> {
    rng: R,

    /// Maximum number of steps in a single playout.
    max_steps: usize,
}

impl<R: Rng> RandomRollout<R> {
    /// Create a new random rollout policy.
    ///
    /// # Arguments
    /// * `rng` - Random number generator for action sampling
    /// * `max_steps` - Maximum steps per playout
    pub fn new(rng: R, max_steps: usize) -> Self {
        Self { rng, max_steps }
    }
}

impl<E: Environment, R: Rng> RolloutPolicy<E> for RandomRollout<R> {
    fn rollout(&mut self, env: &mut E, start: &E::State) -> Result<f32> {
        env.set_state(start)?;

        let mut state = start.clone();
        let mut total_reward = 0.0;

        for _ in 0..self.max_steps {
            let actions = env.legal_actions(&state);
            if actions.is_empty() {
                break;
            }

            let action = actions[self.rng.gen_range(0..actions.len())];
            let transition = env.step(&state, action)?;
            total_reward += transition.reward;
            if transition.terminated {
                break;
            }
            state = transition.state;
        }

        Ok(total_reward)
    }
}
