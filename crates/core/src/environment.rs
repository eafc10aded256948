use std::hash::Hash;

use crate::Result;

/// Outcome of applying a single action in an environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<S> {
    /// State the environment moved to.
    pub state: S,

    /// Scalar reward emitted by the step.
    pub reward: f32,

    /// Whether the episode ended with this step.
    pub terminated: bool,
}

/// An environment abstraction for MCTS planning.
///
/// This trait defines the capability set the planner requires from a
/// simulator. It is designed to be domain-agnostic: anything exposing
/// discrete actions, state transitions, and scalar rewards can be planned
/// against, from grid worlds to bandit problems.
///
/// Environments may carry internal mutable state (a "current position").
/// The planner never assumes that internal state matches a tree node's
/// state except immediately after a `set_state` call; every `step` receives
/// the state to act from explicitly.
pub trait Environment {
    /// An environment state snapshot (e.g., a grid cell index)
    type State: Clone;

    /// A discrete action (e.g., a movement direction)
    type Action: Clone + Copy + Eq + Hash;

    /// Returns all legal actions from the given state.
    ///
    /// Legality may depend on the state; an empty set means no further
    /// decisions are possible from there.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action from the given state and reports the outcome.
    ///
    /// Must be deterministic given `(state, action)` for non-stochastic
    /// environments. Also moves the environment's internal position to the
    /// resulting state.
    ///
    /// # Errors
    /// Implementations report invalid state/action pairs; the planner
    /// propagates these verbatim and aborts the current search.
    fn step(&mut self, state: &Self::State, action: Self::Action) -> Result<Transition<Self::State>>;

    /// Produces a fresh starting state.
    ///
    /// Used by episode-loop callers; the planner's internal rollouts
    /// re-enter the environment via `set_state` instead.
    fn reset(&mut self) -> Self::State;

    /// Forces the environment's internal state to the given value.
    ///
    /// Called before a rollout starts from a tree node's state rather than
    /// from wherever the environment currently is.
    ///
    /// # Errors
    /// Implementations report states that do not belong to the environment.
    fn set_state(&mut self, state: &Self::State) -> Result<()>;
}
