//! Monte Carlo Tree Search planner.
//!
//! This crate provides a generic MCTS implementation that can be used with
//! any simulator implementing the `planner_core::Environment` trait.
//!
//! # Features
//!
//! - **Generic**: Works with any `Environment` implementation
//! - **UCB1 Selection**: Balances average observed reward against
//!   under-visitation during tree descent
//! - **Pluggable Rollouts**: Any `RolloutPolicy` producing a scalar return
//!   from a state can replace the default uniform-random playout
//! - **Reproducible**: All random choices draw from injectable RNGs, so a
//!   fixed seed reproduces the exact tree and decision
//!
//! # Example
//!
//! ```
//! use planner_mcts::{Mcts, MctsConfig, RandomRollout, envs::GridWorld};
//! use planner_core::Environment;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut env = GridWorld::four_by_four();
//! let state = env.reset();
//!
//! let config = MctsConfig::with_iterations(200);
//! let rollouts = RandomRollout::new(ChaCha8Rng::seed_from_u64(1), 100);
//! let mut planner = Mcts::new(config, rollouts, ChaCha8Rng::seed_from_u64(42));
//!
//! let action = planner.search(&mut env, state).expect("planning failed");
//! println!("Planned action: {:?}", action);
//! ```

pub mod config;
pub mod envs;
mod node;
pub mod rollout;
pub mod search;
mod tree;

pub use config::MctsConfig;
pub use rollout::{RandomRollout, RolloutPolicy};
pub use search::Mcts;
