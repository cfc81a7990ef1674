use std::fmt;
use std::ops::Neg;

#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Player {
    Player1,
    Player2,
}

impl Neg for Player {
    type Output = Player;
    fn neg(self) -> Self::Output {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Player::Player1 => write!(f, "P1"),
            Player::Player2 => write!(f, "P2"),
        }
    }
}

/// Indicates if a node is a chance (nature) node or a player's decision point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd)]
pub enum ChanceOrPlayer {
    Player(Player),
    Chance,
}
