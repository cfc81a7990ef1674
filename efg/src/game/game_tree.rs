use crate::game::{GameError, InfosetId, Node, NodeId, Player};
use log::debug;

/// Tolerance used when checking that chance distributions sum to one.
const CHANCE_TOLERANCE: f64 = 1e-6;

/// An immutable two-player zero-sum extensive-form game stored as an arena of
/// nodes indexed by their `NodeId`.
///
/// Construction validates that the nodes form a single tree rooted at `root`,
/// that chance distributions are proper, and that every member of an
/// information set exposes the same action names. Members of an information
/// set have their actions reordered to follow the first member, so an action
/// index is meaningful across the whole set.
///
/// Information set ids are dense per player: player `p` owns sets
/// `0..num_infosets(p)`, each with at least one member. Members are listed in
/// increasing node id.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<Node>,
    root: NodeId,

    infosets_pl1: Vec<Vec<NodeId>>,
    infosets_pl2: Vec<Vec<NodeId>>,

    // Product of chance probabilities on the path from the root to each node.
    nature_probabilities: Vec<f64>,

    min_payoff: f64,
    max_payoff: f64,
}

impl GameTree {
    pub fn new(mut nodes: Vec<Node>, root: NodeId) -> Result<GameTree, GameError> {
        if nodes.is_empty() {
            return Err(GameError::Empty);
        }
        for (position, node) in nodes.iter().enumerate() {
            if node.id() != position {
                return Err(GameError::MisnumberedNode {
                    position,
                    id: node.id(),
                });
            }
        }
        if root >= nodes.len() {
            return Err(GameError::Unreachable(root));
        }

        Self::validate_nodes(&nodes)?;
        let nature_probabilities = Self::nature_reach(&nodes, root)?;
        let infosets_pl1 = Self::collect_infosets(&mut nodes, Player::Player1)?;
        let infosets_pl2 = Self::collect_infosets(&mut nodes, Player::Player2)?;

        let (min_payoff, max_payoff) = nodes
            .iter()
            .filter_map(|node| node.payoff())
            .fold((std::f64::INFINITY, std::f64::NEG_INFINITY), |(lo, hi), x| {
                (f64::min(lo, x), f64::max(hi, x))
            });

        debug!(
            "Game tree with {:?} nodes, {:?} infosets (P1), {:?} infosets (P2)",
            nodes.len(),
            infosets_pl1.len(),
            infosets_pl2.len()
        );

        Ok(GameTree {
            nodes,
            root,
            infosets_pl1,
            infosets_pl2,
            nature_probabilities,
            min_payoff,
            max_payoff,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, node_id: NodeId) -> &Node {
        &self.nodes[node_id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_leaf(&self, node_id: NodeId) -> bool {
        self.nodes[node_id].is_leaf()
    }

    /// Payoff to player 1 at a leaf, `None` at internal nodes.
    pub fn terminal_value(&self, node_id: NodeId) -> Option<f64> {
        self.nodes[node_id].payoff()
    }

    pub fn num_infosets(&self, player: Player) -> usize {
        self.infosets(player).len()
    }

    /// Nodes belonging to an information set, in increasing node id.
    pub fn information_set_members(&self, player: Player, infoset_id: InfosetId) -> &[NodeId] {
        &self.infosets(player)[infoset_id]
    }

    /// Representative node of an information set, whose action order is canonical.
    pub fn first_member(&self, player: Player, infoset_id: InfosetId) -> &Node {
        &self.nodes[self.infosets(player)[infoset_id][0]]
    }

    pub fn nature_probability(&self, node_id: NodeId) -> f64 {
        self.nature_probabilities[node_id]
    }

    /// Smallest and largest leaf payoff (for player 1).
    pub fn payoff_bounds(&self) -> (f64, f64) {
        (self.min_payoff, self.max_payoff)
    }

    /// Largest payoff magnitude over all leaves.
    pub fn largest_payoff(&self) -> f64 {
        f64::max(self.min_payoff.abs(), self.max_payoff.abs())
    }

    pub fn leaves<'a>(&'a self) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(|node| node.is_leaf())
    }

    fn infosets(&self, player: Player) -> &Vec<Vec<NodeId>> {
        match player {
            Player::Player1 => &self.infosets_pl1,
            Player::Player2 => &self.infosets_pl2,
        }
    }

    fn validate_nodes(nodes: &[Node]) -> Result<(), GameError> {
        for node in nodes.iter() {
            if let Some(payoff) = node.payoff() {
                if !payoff.is_finite() {
                    return Err(GameError::NonFinitePayoff(node.id()));
                }
                continue;
            }
            if node.actions().is_empty() {
                return Err(GameError::NoActions(node.id()));
            }
            for (index, action) in node.actions().iter().enumerate() {
                if action.child() >= nodes.len() {
                    return Err(GameError::UnknownChild {
                        node: node.id(),
                        child: action.child(),
                    });
                }
                if node.actions()[..index]
                    .iter()
                    .any(|other| other.name() == action.name())
                {
                    return Err(GameError::DuplicateAction {
                        node: node.id(),
                        name: action.name().to_string(),
                    });
                }
            }
            if node.is_chance() {
                let total: f64 = node.actions().iter().map(|a| a.probability()).sum();
                let negative = node.actions().iter().any(|a| a.probability() < 0.0);
                if negative || !abs_diff_eq!(total, 1.0, epsilon = CHANCE_TOLERANCE) {
                    return Err(GameError::BadChanceDistribution {
                        node: node.id(),
                        total,
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks that the nodes form a tree under `root` and computes the
    /// probability with which nature lets each node be reached.
    fn nature_reach(nodes: &[Node], root: NodeId) -> Result<Vec<f64>, GameError> {
        let mut has_parent = vec![false; nodes.len()];
        for node in nodes.iter() {
            for action in node.actions() {
                if action.child() == root || has_parent[action.child()] {
                    return Err(GameError::MultipleParents(action.child()));
                }
                has_parent[action.child()] = true;
            }
        }

        let mut reach = vec![std::f64::NAN; nodes.len()];
        let mut stack = vec![(root, 1.0)];
        while let Some((node_id, probability)) = stack.pop() {
            reach[node_id] = probability;
            let node = &nodes[node_id];
            for action in node.actions() {
                let factor = if node.is_chance() {
                    action.probability()
                } else {
                    1.0
                };
                stack.push((action.child(), probability * factor));
            }
        }

        match reach.iter().position(|x| x.is_nan()) {
            Some(node_id) => Err(GameError::Unreachable(node_id)),
            None => Ok(reach),
        }
    }

    /// Groups the decision nodes of `player` by information set and reorders
    /// every member's actions to match the first member.
    fn collect_infosets(nodes: &mut [Node], player: Player) -> Result<Vec<Vec<NodeId>>, GameError> {
        let mut members = Vec::<Vec<NodeId>>::new();
        for node in nodes.iter() {
            if let Some(infoset_id) = node.infoset_of(player) {
                if members.len() <= infoset_id {
                    members.resize(infoset_id + 1, vec![]);
                }
                members[infoset_id].push(node.id());
            }
        }

        for (infoset, infoset_members) in members.iter().enumerate() {
            let (first, rest) = match infoset_members.split_first() {
                Some(split) => split,
                None => return Err(GameError::EmptyInformationSet { player, infoset }),
            };
            let canonical: Vec<String> = nodes[*first]
                .actions()
                .iter()
                .map(|a| a.name().to_string())
                .collect();

            for &node_id in rest {
                let inconsistent = GameError::InconsistentActions {
                    player,
                    infoset,
                    node: node_id,
                };
                let node = &mut nodes[node_id];
                if node.actions().len() != canonical.len() {
                    return Err(inconsistent);
                }
                let mut reordered = Vec::with_capacity(canonical.len());
                for name in canonical.iter() {
                    match node.action_index(name) {
                        Some(index) => reordered.push(node.actions()[index].clone()),
                        None => return Err(inconsistent),
                    }
                }
                *node.actions_mut() = reordered;
            }
        }
        Ok(members)
    }
}

#[cfg(test)]
pub mod test_fixtures {
    use crate::game::{Action, GameTree, Node, Player};
    use lazy_static::lazy_static;

    lazy_static! {
        // Nature deals a private card (Low/High, equally likely) to player 1,
        // who may Fold (-1) or Bet. After a Bet, player 2 (who did not see
        // the card) may Fold (+1) or Call (+2 / -2).
        //
        //                 0:chance
        //          Low /            \ High
        //     1:P1 infoset 0     2:P1 infoset 1
        //   Fold/   \Bet         Fold/   \Bet
        //    3     4:P2 I0        5     6:P2 I0
        //        Fold/ \Call          Fold/ \Call
        //          7    8               9   10
        pub static ref BET_OR_FOLD: GameTree = GameTree::new(
            vec![
                Node::chance(0, vec![Action::chance("Low", 1, 0.5), Action::chance("High", 2, 0.5)]),
                Node::decision(1, Player::Player1, 0, vec![Action::new("Fold", 3), Action::new("Bet", 4)]),
                Node::decision(2, Player::Player1, 1, vec![Action::new("Fold", 5), Action::new("Bet", 6)]),
                Node::leaf(3, -1.0),
                Node::decision(4, Player::Player2, 0, vec![Action::new("Fold", 7), Action::new("Call", 8)]),
                Node::leaf(5, -1.0),
                Node::decision(6, Player::Player2, 0, vec![Action::new("Call", 10), Action::new("Fold", 9)]),
                Node::leaf(7, 1.0),
                Node::leaf(8, -2.0),
                Node::leaf(9, 1.0),
                Node::leaf(10, 2.0),
            ],
            0
        )
        .unwrap();
    }
}
