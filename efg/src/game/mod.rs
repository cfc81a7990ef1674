mod error;
mod game_tree;
mod infoset;
mod node;
mod payoff;
mod player;

pub use self::error::GameError;
pub use self::game_tree::GameTree;
pub use self::infoset::Infoset;
pub use self::node::{Action, InfosetId, Node, NodeId, NodeKind};
pub use self::payoff::{PayoffMatrix, PayoffMatrixEntry};
pub use self::player::{ChanceOrPlayer, Player};

#[cfg(test)]
pub use self::game_tree::test_fixtures;
