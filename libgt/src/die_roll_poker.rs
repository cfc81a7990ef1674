/// Die-roll poker: each round, both players roll a private die and then bet.
///
/// Betting per round: player 1 checks or bets; after a check player 2 checks
/// or bets; a bet is answered by a fold or a call. Each player antes `ante`
/// and bets are of size `bet_sizes[round]`. At showdown the higher sum of own
/// rolls wins the opponent's contribution, equal sums split.
use crate::game_tree::{ChanceOrPlayer, GameTreeVertex, Leaf, VertexOrLeaf};
use efg_lite::game::Player;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct DieRollPoker {
    pub num_sides: usize,
    pub ante: f64,
    pub bet_sizes: Vec<f64>,
}

impl Default for DieRollPoker {
    fn default() -> DieRollPoker {
        DieRollPoker {
            num_sides: 3,
            ante: 1.0,
            bet_sizes: vec![2.0, 4.0],
        }
    }
}

impl DieRollPoker {
    pub fn new(num_sides: usize) -> DieRollPoker {
        DieRollPoker {
            num_sides,
            ..Default::default()
        }
    }

    pub fn num_rounds(&self) -> usize {
        self.bet_sizes.len()
    }

    /// Largest amount a player can win or lose.
    pub fn largest_payoff(&self) -> f64 {
        self.ante + self.bet_sizes.iter().sum::<f64>()
    }

    pub fn initial_state(&self) -> State {
        assert!(self.num_sides > 0 && self.num_rounds() > 0);
        State {
            game: self,
            rolls: [vec![], vec![]],
            rounds: vec![vec![]],
            contributions: [self.ante, self.ante],
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialOrd, PartialEq)]
pub enum DrpAction {
    Roll(usize),
    Check,
    Bet,
    Fold,
    Call,
}

impl fmt::Display for DrpAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DrpAction::Roll(side) => write!(f, "{}", side),
            DrpAction::Check => write!(f, "check"),
            DrpAction::Bet => write!(f, "bet"),
            DrpAction::Fold => write!(f, "fold"),
            DrpAction::Call => write!(f, "call"),
        }
    }
}

/// A player sees its own rolls and the public betting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlayerInfo {
    rolls: Vec<usize>,
    rounds: Vec<Vec<DrpAction>>,
}

#[derive(Debug, Clone)]
pub struct State<'a> {
    game: &'a DieRollPoker,
    rolls: [Vec<usize>; 2],
    // Betting of every round so far, the last one being the current round.
    rounds: Vec<Vec<DrpAction>>,
    contributions: [f64; 2],
}

impl<'a> State<'a> {
    fn round(&self) -> usize {
        self.rounds.len() - 1
    }

    fn current_betting(&self) -> &[DrpAction] {
        &self.rounds[self.round()]
    }

    fn player_index(player: Player) -> usize {
        match player {
            Player::Player1 => 0,
            Player::Player2 => 1,
        }
    }

    fn showdown(&self) -> f64 {
        let sum_pl1: usize = self.rolls[0].iter().sum();
        let sum_pl2: usize = self.rolls[1].iter().sum();
        if sum_pl1 > sum_pl2 {
            self.contributions[1]
        } else if sum_pl1 < sum_pl2 {
            -self.contributions[0]
        } else {
            0.0
        }
    }

    fn end_round(mut self) -> VertexOrLeaf<State<'a>> {
        if self.rounds.len() == self.game.num_rounds() {
            VertexOrLeaf::Leaf(Leaf {
                payoff_pl1: self.showdown(),
            })
        } else {
            self.rounds.push(vec![]);
            VertexOrLeaf::Vertex(self)
        }
    }
}

impl<'a> GameTreeVertex for State<'a> {
    type PlayerInfo = PlayerInfo;
    type Action = DrpAction;

    fn next_player(&self) -> ChanceOrPlayer {
        let round = self.round();
        if self.rolls[0].len() == round || self.rolls[1].len() == round {
            return ChanceOrPlayer::Chance;
        }
        match self.current_betting() {
            [] | [DrpAction::Check, DrpAction::Bet] => ChanceOrPlayer::Player(Player::Player1),
            _ => ChanceOrPlayer::Player(Player::Player2),
        }
    }

    fn player_information(&self) -> PlayerInfo {
        let rolls = match self.next_player() {
            ChanceOrPlayer::Player(player) => self.rolls[Self::player_index(player)].clone(),
            ChanceOrPlayer::Chance => vec![],
        };
        PlayerInfo {
            rolls,
            rounds: self.rounds.clone(),
        }
    }

    fn available_actions(&self) -> Box<[(DrpAction, f64)]> {
        if self.next_player() == ChanceOrPlayer::Chance {
            let probability = 1.0 / self.game.num_sides as f64;
            return (1..=self.game.num_sides)
                .map(|side| (DrpAction::Roll(side), probability))
                .collect();
        }
        let actions = match self.current_betting() {
            [] | [DrpAction::Check] => vec![DrpAction::Check, DrpAction::Bet],
            _ => vec![DrpAction::Fold, DrpAction::Call],
        };
        actions.into_iter().map(|a| (a, 0.0)).collect()
    }

    fn next_state(&self, action: &DrpAction) -> VertexOrLeaf<Self> {
        let mut next = self.clone();
        let actor = match self.next_player() {
            ChanceOrPlayer::Player(player) => Self::player_index(player),
            ChanceOrPlayer::Chance => {
                if let DrpAction::Roll(side) = *action {
                    let roller = if self.rolls[0].len() == self.round() { 0 } else { 1 };
                    next.rolls[roller].push(side);
                }
                return VertexOrLeaf::Vertex(next);
            }
        };

        let round = next.round();
        next.rounds[round].push(*action);
        match *action {
            DrpAction::Fold => VertexOrLeaf::Leaf(Leaf {
                payoff_pl1: if actor == 0 {
                    -next.contributions[0]
                } else {
                    next.contributions[1]
                },
            }),
            DrpAction::Call => {
                next.contributions[actor] = next.contributions[1 - actor];
                next.end_round()
            }
            DrpAction::Bet => {
                next.contributions[actor] += self.game.bet_sizes[round];
                VertexOrLeaf::Vertex(next)
            }
            DrpAction::Check if next.current_betting().len() == 2 => next.end_round(),
            _ => VertexOrLeaf::Vertex(next),
        }
    }
}
