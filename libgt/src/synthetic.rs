/// Seeded random games with a private type for player 1.
///
/// Nature first draws a type for player 1 uniformly at random. The players
/// then alternate, starting with player 1, for `depth` moves with
/// `branching` actions each. Moves are public; only the type is private.
/// Leaf payoffs are drawn uniformly from `payoff_range`.
use crate::game_tree::{ChanceOrPlayer, GameTreeVertex, Leaf, VertexOrLeaf};
use efg_lite::game::Player;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct RandomGameConfig {
    pub num_types: usize,
    pub depth: usize,
    pub branching: usize,
    pub payoff_range: (f64, f64),
}

impl Default for RandomGameConfig {
    fn default() -> RandomGameConfig {
        RandomGameConfig {
            num_types: 2,
            depth: 3,
            branching: 2,
            payoff_range: (-1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomGame {
    config: RandomGameConfig,
    // Indexed by type * branching^depth + the history read as a base-`branching` number.
    payoffs: Vec<f64>,
}

impl RandomGame {
    pub fn new(config: RandomGameConfig, seed: u64) -> RandomGame {
        assert!(config.num_types > 0 && config.depth > 0 && config.branching > 0);
        assert!(config.payoff_range.0 < config.payoff_range.1);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let num_leaves = config.num_types * config.branching.pow(config.depth as u32);
        let (low, high) = config.payoff_range;
        let payoffs = (0..num_leaves)
            .map(|_| rng.gen_range(low, high))
            .collect::<Vec<f64>>();

        RandomGame { config, payoffs }
    }

    pub fn config(&self) -> &RandomGameConfig {
        &self.config
    }

    pub fn initial_state(&self) -> State {
        State {
            game: self,
            p1_type: None,
            history: vec![],
        }
    }

    fn payoff(&self, p1_type: usize, history: &[usize]) -> f64 {
        let index = history
            .iter()
            .fold(p1_type, |acc, &a| acc * self.config.branching + a);
        self.payoffs[index]
    }
}

#[derive(Debug, Clone)]
pub struct State<'a> {
    game: &'a RandomGame,
    p1_type: Option<usize>,
    history: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialOrd, PartialEq)]
pub enum SyntheticAction {
    Type(usize),
    Move(usize),
}

impl fmt::Display for SyntheticAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyntheticAction::Type(t) => write!(f, "t{}", t),
            SyntheticAction::Move(m) => write!(f, "m{}", m),
        }
    }
}

/// Player 1 observes its type, player 2 does not. Both see every move.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlayerInfo {
    p1_type: Option<usize>,
    history: Vec<usize>,
}

impl<'a> GameTreeVertex for State<'a> {
    type PlayerInfo = PlayerInfo;
    type Action = SyntheticAction;

    fn next_player(&self) -> ChanceOrPlayer {
        match self.p1_type {
            None => ChanceOrPlayer::Chance,
            Some(_) if self.history.len() % 2 == 0 => ChanceOrPlayer::Player(Player::Player1),
            Some(_) => ChanceOrPlayer::Player(Player::Player2),
        }
    }

    fn player_information(&self) -> PlayerInfo {
        let p1_type = match self.next_player() {
            ChanceOrPlayer::Player(Player::Player1) => self.p1_type,
            _ => None,
        };
        PlayerInfo {
            p1_type,
            history: self.history.clone(),
        }
    }

    fn available_actions(&self) -> Box<[(SyntheticAction, f64)]> {
        let config = &self.game.config;
        match self.p1_type {
            None => (0..config.num_types)
                .map(|t| (SyntheticAction::Type(t), 1.0 / config.num_types as f64))
                .collect(),
            Some(_) => (0..config.branching)
                .map(|m| (SyntheticAction::Move(m), 0.0))
                .collect(),
        }
    }

    fn next_state(&self, action: &SyntheticAction) -> VertexOrLeaf<Self> {
        let mut next = self.clone();
        match *action {
            SyntheticAction::Type(t) => next.p1_type = Some(t),
            SyntheticAction::Move(m) => next.history.push(m),
        }
        match next.p1_type {
            Some(p1_type) if next.history.len() == self.game.config.depth => {
                VertexOrLeaf::Leaf(Leaf {
                    payoff_pl1: self.game.payoff(p1_type, &next.history),
                })
            }
            _ => VertexOrLeaf::Vertex(next),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameTreeBuilder;
    use efg_lite::treeplex::Treeplex;

    #[test]
    fn random_game_shape() {
        let random_game = RandomGame::new(RandomGameConfig::default(), 7);
        let game = GameTreeBuilder::new()
            .make_game(&random_game.initial_state())
            .unwrap();

        // 1 chance node, 2 * (1 + 2 + 4) decision nodes, 2 * 8 leaves.
        assert_eq!(game.num_nodes(), 1 + 14 + 16);
        assert_eq!(game.leaves().count(), 16);
        // Player 1 moves at depths 0 and 2 and sees its type.
        assert_eq!(game.num_infosets(Player::Player1), 2 * (1 + 4));
        // Player 2 moves at depth 1 and only sees the history.
        assert_eq!(game.num_infosets(Player::Player2), 2);
        assert!(game.largest_payoff() <= 1.0);

        assert!(Treeplex::new(&game, Player::Player1).is_ok());
        assert!(Treeplex::new(&game, Player::Player2).is_ok());
    }

    #[test]
    fn same_seed_same_payoffs() {
        let config = RandomGameConfig::default();
        let first = RandomGame::new(config.clone(), 11);
        let second = RandomGame::new(config.clone(), 11);
        let third = RandomGame::new(config, 12);
        assert_eq!(first.payoffs, second.payoffs);
        assert_ne!(first.payoffs, third.payoffs);
    }
}
