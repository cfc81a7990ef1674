use efg_lite::game::ChanceOrPlayer;
use std::fmt::{Debug, Display};

/// `GameTreeVertex` is the main trait that should be implemented by the game generator.
/// The game generator implicitly defines a game tree based on the implemented functions.
pub trait GameTreeVertex
where
    Self: Debug + Clone,
{
    // Information set for a given state (assuming its a player's move). Two
    // vertices of the same player with equal `PlayerInfo` share an information set.
    type PlayerInfo: Eq + Ord + Debug + Clone;

    // Actions which could be taken, either by a player or by chance. The
    // `Display` form becomes the action name in the game tree, so it must be
    // unique among the actions of one vertex.
    type Action: Eq + Ord + Debug + Display + Clone;

    fn next_player(&self) -> ChanceOrPlayer;
    fn player_information(&self) -> Self::PlayerInfo;

    /// Actions paired with their probabilities. The probability is ignored
    /// at player vertices.
    fn available_actions(&self) -> Box<[(Self::Action, f64)]>;
    fn next_state(&self, action: &Self::Action) -> VertexOrLeaf<Self>;
}

/// Indicates if we are at a vertex (chance or player) or a leaf (terminal) vertex.
pub enum VertexOrLeaf<T: GameTreeVertex> {
    Leaf(Leaf),
    Vertex(T),
}

/// Terminal state of the game. Only player 1's payoff is stored since games
/// are zero-sum. Chance factors and preceding sequences are computed by the
/// game tree itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Leaf {
    pub payoff_pl1: f64,
}
