use crate::game::{InfosetId, NodeId, Player};
use thiserror::Error;

/// Structural problems detected while assembling a `GameTree` or one of its
/// treeplexes, and sequence vectors that do not fit a treeplex.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("game tree has no nodes")]
    Empty,
    #[error("node stored at position {position} carries id {id}")]
    MisnumberedNode { position: usize, id: NodeId },
    #[error("node {node} points to missing child {child}")]
    UnknownChild { node: NodeId, child: NodeId },
    #[error("node {0} is reached from more than one parent")]
    MultipleParents(NodeId),
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),
    #[error("decision node {0} has no actions")]
    NoActions(NodeId),
    #[error("node {node} repeats action name {name:?}")]
    DuplicateAction { node: NodeId, name: String },
    #[error("chance probabilities at node {node} sum to {total}")]
    BadChanceDistribution { node: NodeId, total: f64 },
    #[error("leaf {0} has a non-finite payoff")]
    NonFinitePayoff(NodeId),
    #[error("information set {infoset} of {player} has no member nodes")]
    EmptyInformationSet { player: Player, infoset: InfosetId },
    #[error("node {node} in information set {infoset} of {player} has actions differing from the first member")]
    InconsistentActions {
        player: Player,
        infoset: InfosetId,
        node: NodeId,
    },
    #[error("information set {infoset} of {player} is reached after different own sequences")]
    ImperfectRecall { player: Player, infoset: InfosetId },
    #[error("sequence vector of length {actual} for a treeplex of {player} with {expected} sequences")]
    SequenceVectorLength {
        player: Player,
        expected: usize,
        actual: usize,
    },
}
