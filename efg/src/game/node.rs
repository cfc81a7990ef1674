use crate::game::{ChanceOrPlayer, Player};

pub type NodeId = usize;
pub type InfosetId = usize;

/// A named edge from a node to one of its children. `probability` is only
/// meaningful for actions leaving a chance node.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: String,
    child: NodeId,
    probability: f64,
}

impl Action {
    pub fn new<S: Into<String>>(name: S, child: NodeId) -> Action {
        Action {
            name: name.into(),
            child,
            probability: 1.0,
        }
    }

    pub fn chance<S: Into<String>>(name: S, child: NodeId, probability: f64) -> Action {
        Action {
            name: name.into(),
            child,
            probability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Chance,
    Decision { player: Player, infoset: InfosetId },
    Leaf { payoff: f64 },
}

/// A vertex of the game tree. Leaves carry the payoff of player 1; the game is
/// zero-sum, so player 2 receives the negation.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    actions: Vec<Action>,
}

impl Node {
    pub fn leaf(id: NodeId, payoff: f64) -> Node {
        Node {
            id,
            kind: NodeKind::Leaf { payoff },
            actions: vec![],
        }
    }

    pub fn chance(id: NodeId, actions: Vec<Action>) -> Node {
        Node {
            id,
            kind: NodeKind::Chance,
            actions,
        }
    }

    pub fn decision(id: NodeId, player: Player, infoset: InfosetId, actions: Vec<Action>) -> Node {
        Node {
            id,
            kind: NodeKind::Decision { player, infoset },
            actions,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        match self.kind {
            NodeKind::Leaf { .. } => true,
            _ => false,
        }
    }

    pub fn is_chance(&self) -> bool {
        self.kind == NodeKind::Chance
    }

    /// Owner of the node, `None` for leaves.
    pub fn owner(&self) -> Option<ChanceOrPlayer> {
        match self.kind {
            NodeKind::Chance => Some(ChanceOrPlayer::Chance),
            NodeKind::Decision { player, .. } => Some(ChanceOrPlayer::Player(player)),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Acting player, `None` for chance nodes and leaves.
    pub fn player(&self) -> Option<Player> {
        match self.kind {
            NodeKind::Decision { player, .. } => Some(player),
            _ => None,
        }
    }

    pub fn infoset(&self) -> Option<InfosetId> {
        match self.kind {
            NodeKind::Decision { infoset, .. } => Some(infoset),
            _ => None,
        }
    }

    /// Whether `player` acts at this node, returning the information set if so.
    pub fn infoset_of(&self, player: Player) -> Option<InfosetId> {
        match self.kind {
            NodeKind::Decision {
                player: owner,
                infoset,
            } if owner == player => Some(infoset),
            _ => None,
        }
    }

    pub fn payoff(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Leaf { payoff } => Some(payoff),
            _ => None,
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action_index(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.name() == name)
    }

    pub(crate) fn actions_mut(&mut self) -> &mut Vec<Action> {
        &mut self.actions
    }
}
