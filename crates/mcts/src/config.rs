//! Search configuration parameters.

/// Configuration for a Monte Carlo Tree Search run.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Number of select/expand/simulate/backpropagate iterations per search.
    ///
    /// Iterations are opportunities, not a guaranteed number of simulations:
    /// an iteration whose selection lands on a terminal node consumes budget
    /// without simulating.
    pub iterations: usize,

    /// Weight of the UCB1 exploration term during tree descent.
    ///
    /// The final decision always uses weight zero (pure exploitation over
    /// average reward), regardless of this value.
    pub exploration_weight: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration_weight: 1.41,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified iteration budget.
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Default::default()
        }
    }
}
