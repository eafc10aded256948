//! Validation environments for the planner.
//!
//! These environments are used to verify the search engine before applying
//! it to real simulators; the engine itself never assumes their semantics.

pub mod grid_world;

pub use grid_world::{GridWorld, Move, Tile};
