use efg_lite::game::{Action, ChanceOrPlayer, GameError, GameTree, InfosetId, Node, NodeId, Player};
use crate::game_tree::{GameTreeVertex, VertexOrLeaf};

use itertools::Itertools;
use log::debug;
use std::collections::BTreeMap;

/// Builder for a `GameTree`. Traverses an implicitly defined game from an
/// initial vertex, numbers nodes in discovery order and assigns dense
/// information set ids per player in the order the sets are first reached.
///
/// Actions at player vertices are sorted by `GameTreeVertex::Action`, chance
/// actions keep the order given by the generator.
pub struct GameTreeBuilder<T: GameTreeVertex> {
    nodes: BTreeMap<NodeId, Node>,
    next_node_id: NodeId,

    infosets_pl1: BTreeMap<T::PlayerInfo, InfosetId>,
    infosets_pl2: BTreeMap<T::PlayerInfo, InfosetId>,
}

impl<T> GameTreeBuilder<T>
where
    T: GameTreeVertex,
{
    pub fn new() -> GameTreeBuilder<T> {
        GameTreeBuilder {
            nodes: BTreeMap::new(),
            next_node_id: 0,
            infosets_pl1: BTreeMap::new(),
            infosets_pl2: BTreeMap::new(),
        }
    }

    /// Expands the whole game below `initial_vertex`. The builder is consumed
    /// since its tables only describe a single traversal.
    pub fn make_game(mut self, initial_vertex: &T) -> Result<GameTree, GameError> {
        let root = self.reserve_node_id();

        // Walk over game tree.
        let mut vertex_stack = Vec::<(T, NodeId)>::new();
        vertex_stack.push((initial_vertex.clone(), root));

        while let Some((vertex, node_id)) = vertex_stack.pop() {
            let node = match vertex.next_player() {
                ChanceOrPlayer::Chance => {
                    let actions = self.expand(&vertex, vertex.available_actions().to_vec(), &mut vertex_stack);
                    Node::chance(node_id, actions)
                }
                ChanceOrPlayer::Player(player) => {
                    let actions_list = vertex
                        .available_actions()
                        .iter()
                        .cloned()
                        .sorted_by(|a, b| a.0.cmp(&b.0))
                        .collect::<Vec<_>>();
                    let infoset_id = self.infoset_id(player, vertex.player_information());
                    let actions = self.expand(&vertex, actions_list, &mut vertex_stack);
                    Node::decision(node_id, player, infoset_id, actions)
                }
            };
            self.nodes.insert(node_id, node);
        }

        debug!(
            "Built game with {:?} nodes, {:?} infosets (P1), {:?} infosets (P2)",
            self.nodes.len(),
            self.infosets_pl1.len(),
            self.infosets_pl2.len()
        );

        // Ids were handed out consecutively, so the map's values are in position order.
        let nodes = self.nodes.into_iter().map(|(_, node)| node).collect::<Vec<_>>();
        GameTree::new(nodes, root)
    }

    /// Creates the children of `vertex`: leaves are stored directly, inner
    /// vertices get a node id and are pushed onto the stack.
    fn expand(
        &mut self,
        vertex: &T,
        actions_and_probs: Vec<(T::Action, f64)>,
        vertex_stack: &mut Vec<(T, NodeId)>,
    ) -> Vec<Action> {
        let mut actions = Vec::with_capacity(actions_and_probs.len());
        let mut pending = vec![];
        for (action, prob) in actions_and_probs {
            let child = self.reserve_node_id();
            match vertex.next_state(&action) {
                VertexOrLeaf::Leaf(leaf) => {
                    self.nodes.insert(child, Node::leaf(child, leaf.payoff_pl1));
                }
                VertexOrLeaf::Vertex(next_vertex) => pending.push((next_vertex, child)),
            }
            actions.push(match vertex.next_player() {
                ChanceOrPlayer::Chance => Action::chance(action.to_string(), child, prob),
                ChanceOrPlayer::Player(_) => Action::new(action.to_string(), child),
            });
        }
        // Reversed so that the first action is expanded first.
        vertex_stack.extend(pending.into_iter().rev());
        actions
    }

    fn reserve_node_id(&mut self) -> NodeId {
        let node_id = self.next_node_id;
        self.next_node_id += 1;
        node_id
    }

    fn infoset_id(&mut self, player: Player, info: T::PlayerInfo) -> InfosetId {
        let infosets = match player {
            Player::Player1 => &mut self.infosets_pl1,
            Player::Player2 => &mut self.infosets_pl2,
        };
        let next_id = infosets.len();
        *infosets.entry(info).or_insert(next_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_tree::Leaf;
    use assert_approx_eq::assert_approx_eq;
    use std::fmt;

    /// Matching pennies where player 2 moves second without observing player 1.
    #[derive(Debug, Clone)]
    struct Pennies {
        pl1: Option<Coin>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Coin {
        Heads,
        Tails,
    }

    impl fmt::Display for Coin {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl GameTreeVertex for Pennies {
        type PlayerInfo = ();
        type Action = Coin;

        fn next_player(&self) -> ChanceOrPlayer {
            match self.pl1 {
                None => ChanceOrPlayer::Player(Player::Player1),
                Some(_) => ChanceOrPlayer::Player(Player::Player2),
            }
        }

        fn player_information(&self) {}

        fn available_actions(&self) -> Box<[(Coin, f64)]> {
            vec![(Coin::Tails, 0.0), (Coin::Heads, 0.0)].into_boxed_slice()
        }

        fn next_state(&self, action: &Coin) -> VertexOrLeaf<Self> {
            match self.pl1 {
                None => VertexOrLeaf::Vertex(Pennies { pl1: Some(*action) }),
                Some(coin) => VertexOrLeaf::Leaf(Leaf {
                    payoff_pl1: if coin == *action { 1.0 } else { -1.0 },
                }),
            }
        }
    }

    #[test]
    fn builds_matching_pennies() {
        let game = GameTreeBuilder::new()
            .make_game(&Pennies { pl1: None })
            .unwrap();
        assert_eq!(game.num_nodes(), 7);
        assert_eq!(game.num_infosets(Player::Player1), 1);
        assert_eq!(game.num_infosets(Player::Player2), 1);

        // Generated as Tails, Heads; player actions are ordered by action.
        let root = game.node(game.root());
        assert_eq!(root.actions()[0].name(), "Heads");
        assert_eq!(root.actions()[1].name(), "Tails");
        let pl2_node = game.node(root.actions()[1].child());
        assert_eq!(pl2_node.actions()[0].name(), "Heads");
        assert_eq!(pl2_node.actions()[1].name(), "Tails");

        let members = game.information_set_members(Player::Player2, 0);
        assert_eq!(members.len(), 2);
        assert_approx_eq!(game.largest_payoff(), 1.0);
        let heads_heads = game.node(members[0]).actions()[0].child();
        assert_eq!(game.terminal_value(heads_heads), Some(1.0));
    }
}
