/// Heuristic node evaluations for limited-lookahead opponents.
///
/// An evaluation assigns a value to every node of a game tree, read as the
/// value the opponent believes it will get if play reaches that node. The
/// default heuristic is the payoff expected when every player moves
/// uniformly at random from the node on, optionally perturbed with seeded
/// uniform noise so that the heuristic is imperfect.
use efg_lite::game::{GameTree, NodeId, Player};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeEvaluation {
    /// Half-width of the uniform noise added to every inner node.
    pub noise: f64,
    pub seed: u64,
}

impl Default for NodeEvaluation {
    fn default() -> NodeEvaluation {
        NodeEvaluation {
            noise: 0.0,
            seed: 0,
        }
    }
}

impl NodeEvaluation {
    pub fn new(noise: f64, seed: u64) -> NodeEvaluation {
        NodeEvaluation { noise, seed }
    }

    /// Evaluation table of `player`, indexed by node id. Leaves keep their
    /// exact payoff.
    pub fn table(&self, game: &GameTree, player: Player) -> Vec<f64> {
        let mut values = subtree_means(game, player);
        if self.noise > 0.0 {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
            for (node_id, value) in values.iter_mut().enumerate() {
                if !game.is_leaf(node_id) {
                    *value += rng.gen_range(-self.noise, self.noise);
                }
            }
        }
        values
    }
}

/// Expected payoff of `player` at every node when every decision is made
/// uniformly at random and nature follows its probabilities.
pub fn subtree_means(game: &GameTree, player: Player) -> Vec<f64> {
    let mut preorder: Vec<NodeId> = Vec::with_capacity(game.num_nodes());
    let mut stack = vec![game.root()];
    while let Some(node_id) = stack.pop() {
        preorder.push(node_id);
        for action in game.node(node_id).actions() {
            stack.push(action.child());
        }
    }

    let mut values = vec![0.0; game.num_nodes()];
    for &node_id in preorder.iter().rev() {
        let node = game.node(node_id);
        values[node_id] = match node.payoff() {
            Some(payoff) => match player {
                Player::Player1 => payoff,
                Player::Player2 => -payoff,
            },
            None if node.is_chance() => node
                .actions()
                .iter()
                .map(|action| action.probability() * values[action.child()])
                .sum(),
            None => {
                let total: f64 = node
                    .actions()
                    .iter()
                    .map(|action| values[action.child()])
                    .sum();
                total / node.actions().len() as f64
            }
        };
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{DEEP_TRAP, HIDDEN_COIN};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_subtree_means() {
        let values = subtree_means(&DEEP_TRAP, Player::Player1);
        assert_approx_eq!(values[3], 1.0);
        assert_approx_eq!(values[1], 1.0);
        assert_approx_eq!(values[0], 0.75);
        assert_approx_eq!(values[6], -2.0);

        let values = subtree_means(&DEEP_TRAP, Player::Player2);
        assert_approx_eq!(values[0], -0.75);
        assert_approx_eq!(values[5], -4.0);
    }

    #[test]
    fn test_chance_weighted_means() {
        let values = subtree_means(&HIDDEN_COIN, Player::Player1);
        assert_approx_eq!(values[1], 1.0);
        assert_approx_eq!(values[2], 2.0);
        assert_approx_eq!(values[0], 1.5);
    }

    #[test]
    fn test_noise_is_seeded_and_bounded() {
        let exact = NodeEvaluation::default().table(&DEEP_TRAP, Player::Player2);
        let noisy = NodeEvaluation::new(0.1, 7).table(&DEEP_TRAP, Player::Player2);
        assert_eq!(noisy, NodeEvaluation::new(0.1, 7).table(&DEEP_TRAP, Player::Player2));
        for node_id in 0..DEEP_TRAP.num_nodes() {
            assert!((noisy[node_id] - exact[node_id]).abs() <= 0.1);
            if DEEP_TRAP.is_leaf(node_id) {
                assert_eq!(noisy[node_id], exact[node_id]);
            }
        }
    }
}
