//! The Monte Carlo Tree Search loop.
//!
//! Runs select -> expand -> simulate -> backpropagate iterations against an
//! abstract environment and extracts the final decision by pure
//! exploitation over average reward.

use std::marker::PhantomData;

use planner_core::{Environment, PlannerError, Result};
use rand::Rng;

use crate::{
    config::MctsConfig,
    node::NodeId,
    rollout::RolloutPolicy,
    tree::Tree,
};

/// Monte Carlo Tree Search planner.
///
/// Generic over:
/// - `E`: The environment being planned against
/// - `P`: The rollout policy estimating state values
/// - `R`: The random number generator driving expansion order
///
/// A single `search` call owns its tree and its environment handle for its
/// entire duration; the tree is discarded once the best action is extracted.
/// Concurrent planning requires one engine and one environment per worker.
pub struct Mcts<E: Environment, P: RolloutPolicy<E>, R: Rng> {
    config: MctsConfig,
    policy: P,
    rng: R,
    rewards: Vec<f32>,
    _env: PhantomData<E>,
}

impl<E, P, R> Mcts<E, P, R>
where
    E: Environment,
    P: RolloutPolicy<E>,
    R: Rng,
{
    /// Create a new planner.
    pub fn new(config: MctsConfig, policy: P, rng: R) -> Self {
        Self {
            config,
            policy,
            rng,
            rewards: Vec::new(),
            _env: PhantomData,
        }
    }

    /// Simulated returns recorded by every backpropagation so far, across
    /// all `search` calls on this planner. Iterations that select an
    /// already-terminal node simulate nothing and record nothing.
    pub fn simulation_rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Run MCTS from the given state and return the chosen action.
    ///
    /// The decision is the root child with the highest average reward
    /// (exploration weight forced to zero), not the UCB1-weighted choice
    /// used while descending during search.
    ///
    /// # Errors
    /// - `ZeroIterations` if the configured budget is empty
    /// - `NoLegalActions` if nothing can be done from `root_state`, which
    ///   includes the terminal-root case
    /// - environment failures, which abort the search; tree and environment
    ///   are not separably recoverable mid-iteration, so the caller retries
    ///   with a fresh search
    pub fn search(&mut self, env: &mut E, root_state: E::State) -> Result<E::Action> {
        if self.config.iterations == 0 {
            return Err(PlannerError::ZeroIterations);
        }
        let root_actions = env.legal_actions(&root_state);
        if root_actions.is_empty() {
            return Err(PlannerError::NoLegalActions);
        }

        let mut tree = Tree::rooted(root_state, root_actions);

        for _ in 0..self.config.iterations {
            self.run_iteration(env, &mut tree)?;
        }

        let best = tree.best_child(NodeId::ROOT, 0.0)?;
        Ok(tree
            .get(best)
            .action
            .expect("BUG: non-root node is missing its originating action"))
    }

    /// One select/expand/simulate/backpropagate pass.
    fn run_iteration(&mut self, env: &mut E, tree: &mut Tree<E::State, E::Action>) -> Result<()> {
        // SELECT: descend through fully expanded nodes via UCB1, stopping
        // at a terminal node or the first node with untried actions.
        let mut current = NodeId::ROOT;
        loop {
            let node = tree.get(current);
            if node.terminal || !node.is_fully_expanded() {
                break;
            }
            current = tree.best_child(current, self.config.exploration_weight)?;
        }

        // A terminal selection consumes the iteration without simulating.
        if tree.get(current).terminal {
            return Ok(());
        }

        // EXPAND: try one untried action, picked uniformly at random.
        let (child, step_reward) = self.expand(env, tree, current)?;

        // SIMULATE: the expansion step's own reward is part of the return;
        // a child born terminal gets a zero-length playout.
        let simulated = if tree.get(child).terminal {
            0.0
        } else {
            let start = tree.get(child).state.clone();
            self.policy.rollout(env, &start)?
        };
        let total_return = step_reward + simulated;

        // BACKPROPAGATE along parent links, root inclusive.
        self.backpropagate(tree, child, total_return);
        self.rewards.push(total_return);
        Ok(())
    }

    /// Apply one untried action of `id` and graft the resulting child.
    ///
    /// Returns the new child and the immediate reward of the expansion step.
    fn expand(
        &mut self,
        env: &mut E,
        tree: &mut Tree<E::State, E::Action>,
        id: NodeId,
    ) -> Result<(NodeId, f32)> {
        let node = tree.get_mut(id);
        let pick = self.rng.gen_range(0..node.untried_actions.len());
        let action = node.untried_actions.swap_remove(pick);
        let state = node.state.clone();

        let transition = env.step(&state, action)?;
        let untried = if transition.terminated {
            Vec::new()
        } else {
            env.legal_actions(&transition.state)
        };

        let child = tree.add_child(id, action, transition.state, untried, transition.terminated);
        Ok((child, transition.reward))
    }

    /// Credit a simulated return to every node from `from` up to the root.
    fn backpropagate(&mut self, tree: &mut Tree<E::State, E::Action>, from: NodeId, reward: f32) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = tree.get_mut(id);
            node.visits += 1;
            node.total_reward += reward;
            current = node.parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::RandomRollout;
    use planner_core::Transition;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // Depth-1 test environment: arm 0 always pays 1.0 and terminates,
    // arm 1 always pays 0.0 and terminates.
    struct TwoArmedBandit;

    impl Environment for TwoArmedBandit {
        type State = u8;
        type Action = u8;

        fn legal_actions(&self, state: &u8) -> Vec<u8> {
            if *state == 0 {
                vec![0, 1]
            } else {
                Vec::new()
            }
        }

        fn step(&mut self, state: &u8, action: u8) -> Result<Transition<u8>> {
            if *state != 0 {
                return Err(PlannerError::InvalidState(format!(
                    "cannot pull an arm from state {state}"
                )));
            }
            Ok(Transition {
                state: 1,
                reward: if action == 0 { 1.0 } else { 0.0 },
                terminated: true,
            })
        }

        fn reset(&mut self) -> u8 {
            0
        }

        fn set_state(&mut self, _state: &u8) -> Result<()> {
            Ok(())
        }
    }

    fn bandit_planner(
        seed: u64,
        iterations: usize,
    ) -> Mcts<TwoArmedBandit, RandomRollout<ChaCha8Rng>, ChaCha8Rng> {
        Mcts::new(
            MctsConfig::with_iterations(iterations),
            RandomRollout::new(ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)), 100),
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_bandit_picks_the_rewarding_arm() {
        for seed in 0..10 {
            let mut env = TwoArmedBandit;
            let mut planner = bandit_planner(seed, 4);
            let action = planner.search(&mut env, 0).unwrap();
            assert_eq!(action, 0, "seed {seed} picked the zero-reward arm");
        }
    }

    #[test]
    fn test_zero_iterations_is_a_configuration_error() {
        let mut env = TwoArmedBandit;
        let mut planner = bandit_planner(0, 0);
        let err = planner.search(&mut env, 0).unwrap_err();
        assert!(matches!(err, PlannerError::ZeroIterations));
    }

    #[test]
    fn test_actionless_root_is_a_configuration_error() {
        let mut env = TwoArmedBandit;
        let mut planner = bandit_planner(0, 10);
        // State 1 is the bandit's terminal state: nothing is legal there
        let err = planner.search(&mut env, 1).unwrap_err();
        assert!(matches!(err, PlannerError::NoLegalActions));
    }

    #[test]
    fn test_root_visits_count_simulating_iterations() {
        let mut env = TwoArmedBandit;
        let mut planner = bandit_planner(3, 10);

        let mut tree = Tree::rooted(0u8, env.legal_actions(&0));
        for _ in 0..10 {
            planner.run_iteration(&mut env, &mut tree).unwrap();
        }

        // Both arms expand (and simulate) once; the other eight iterations
        // select an already-terminal child and contribute nothing.
        assert_eq!(tree.root().visits, 2);
        assert_eq!(planner.simulation_rewards().len(), 2);
    }

    #[test]
    fn test_terminal_children_are_never_expanded() {
        let mut env = TwoArmedBandit;
        let mut planner = bandit_planner(5, 10);

        let mut tree = Tree::rooted(0u8, env.legal_actions(&0));
        for _ in 0..10 {
            planner.run_iteration(&mut env, &mut tree).unwrap();
        }

        assert_eq!(tree.len(), 3);
        for &(_, child) in &tree.root().children {
            let node = tree.get(child);
            assert!(node.terminal);
            assert!(node.children.is_empty());
            assert!(node.untried_actions.is_empty());
            // Terminal children carry their expansion step's reward
            assert_eq!(node.visits, 1);
        }
    }

    #[test]
    fn test_expansion_exhausts_untried_actions() {
        let mut env = TwoArmedBandit;
        let mut planner = bandit_planner(7, 10);

        let mut tree = Tree::rooted(0u8, env.legal_actions(&0));
        planner.run_iteration(&mut env, &mut tree).unwrap();
        assert_eq!(tree.root().untried_actions.len(), 1);
        assert_eq!(tree.root().children.len(), 1);

        planner.run_iteration(&mut env, &mut tree).unwrap();
        assert!(tree.root().is_fully_expanded());
        assert_eq!(tree.root().children.len(), 2);

        // Further iterations traverse via best_child; no new nodes appear
        for _ in 0..8 {
            planner.run_iteration(&mut env, &mut tree).unwrap();
        }
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_environment_error_aborts_search() {
        // An environment whose step always fails
        struct Broken;

        impl Environment for Broken {
            type State = u8;
            type Action = u8;

            fn legal_actions(&self, _state: &u8) -> Vec<u8> {
                vec![0]
            }

            fn step(&mut self, _state: &u8, _action: u8) -> Result<Transition<u8>> {
                Err(PlannerError::InvalidAction("broken simulator".into()))
            }

            fn reset(&mut self) -> u8 {
                0
            }

            fn set_state(&mut self, _state: &u8) -> Result<()> {
                Ok(())
            }
        }

        let mut env = Broken;
        let mut planner: Mcts<Broken, _, _> = Mcts::new(
            MctsConfig::with_iterations(10),
            RandomRollout::new(ChaCha8Rng::seed_from_u64(1), 100),
            ChaCha8Rng::seed_from_u64(0),
        );
        let err = planner.search(&mut env, 0).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidAction(_)));
    }
}
