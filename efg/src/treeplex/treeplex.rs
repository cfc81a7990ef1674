use crate::game::{GameError, GameTree, Infoset, InfosetId, NodeId, Player};
use log::debug;

pub type SequenceId = usize;

/// Sequence numbering of one player's decisions in a `GameTree`.
///
/// Sequence 0 is the empty sequence. The sequences of an information set are
/// contiguous and follow the action order of the information set, and every
/// information set is numbered after its parent sequence, so iterating
/// information sets by decreasing `start_sequence` is a bottom-up traversal.
/// Information sets keep the ids they carry in the game tree.
#[derive(Debug, Clone)]
pub struct Treeplex {
    player: Player,
    num_sequences: usize,
    infosets: Box<[Infoset]>,

    // Last sequence of `player` on the path from the root to each node.
    node_sequences: Vec<SequenceId>,

    // `None` for the empty sequence, otherwise (infoset, action index).
    parent_infoset_of_seqs: Vec<Option<(InfosetId, usize)>>,
    child_infosets_of_seqs: Vec<Vec<InfosetId>>,
    sequence_names: Vec<String>,
}

impl Treeplex {
    pub fn new(game: &GameTree, player: Player) -> Result<Treeplex, GameError> {
        let num_infosets = game.num_infosets(player);
        let mut infosets: Vec<Option<Infoset>> = vec![None; num_infosets];
        let mut node_sequences = vec![0; game.num_nodes()];
        let mut parent_infoset_of_seqs = vec![None];
        let mut child_infosets_of_seqs = vec![vec![]];
        let mut sequence_names = vec![String::from("root")];

        let mut stack: Vec<(NodeId, SequenceId)> = vec![(game.root(), 0)];
        while let Some((node_id, sequence)) = stack.pop() {
            node_sequences[node_id] = sequence;
            let node = game.node(node_id);

            let start_sequence = match node.infoset_of(player) {
                None => {
                    for action in node.actions().iter().rev() {
                        stack.push((action.child(), sequence));
                    }
                    continue;
                }
                Some(infoset_id) => match infosets[infoset_id] {
                    Some(infoset) if infoset.parent_sequence != sequence => {
                        return Err(GameError::ImperfectRecall {
                            player,
                            infoset: infoset_id,
                        });
                    }
                    Some(infoset) => infoset.start_sequence,
                    None => {
                        let start_sequence = parent_infoset_of_seqs.len();
                        for (action_index, action) in node.actions().iter().enumerate() {
                            parent_infoset_of_seqs.push(Some((infoset_id, action_index)));
                            child_infosets_of_seqs.push(vec![]);
                            sequence_names.push(format!("I{}.{}", infoset_id, action.name()));
                        }
                        let end_sequence = parent_infoset_of_seqs.len() - 1;
                        infosets[infoset_id] =
                            Some(Infoset::new(sequence, start_sequence, end_sequence));
                        child_infosets_of_seqs[sequence].push(infoset_id);
                        start_sequence
                    }
                },
            };

            for (action_index, action) in node.actions().iter().enumerate().rev() {
                stack.push((action.child(), start_sequence + action_index));
            }
        }

        let infosets = infosets
            .into_iter()
            .enumerate()
            .map(|(infoset, x)| x.ok_or(GameError::EmptyInformationSet { player, infoset }))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Treeplex for {} has {:?} sequences and {:?} infosets",
            player,
            parent_infoset_of_seqs.len(),
            infosets.len()
        );

        Ok(Treeplex {
            player,
            num_sequences: parent_infoset_of_seqs.len(),
            infosets: infosets.into_boxed_slice(),
            node_sequences,
            parent_infoset_of_seqs,
            child_infosets_of_seqs,
            sequence_names,
        })
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    pub fn num_infosets(&self) -> usize {
        self.infosets.len()
    }

    pub fn empty_sequence_id(&self) -> SequenceId {
        0
    }

    pub fn has_sequence(&self, index: SequenceId) -> bool {
        index < self.num_sequences
    }

    pub fn infosets(&self) -> &[Infoset] {
        &self.infosets
    }

    pub fn infoset(&self, infoset_id: InfosetId) -> &Infoset {
        &self.infosets[infoset_id]
    }

    pub fn player(&self) -> Player {
        self.player
    }

    /// Sequence obtained by playing the action at `action_index` in an information set.
    pub fn sequence_id(&self, infoset_id: InfosetId, action_index: usize) -> SequenceId {
        self.infosets[infoset_id].start_sequence + action_index
    }

    /// The sequence of this player leading to `node_id`.
    pub fn node_sequence(&self, node_id: NodeId) -> SequenceId {
        self.node_sequences[node_id]
    }

    /// Information set and action index a sequence ends with, `None` for the empty sequence.
    pub fn parent_infoset_of_seq(&self, sequence_id: SequenceId) -> Option<(InfosetId, usize)> {
        self.parent_infoset_of_seqs[sequence_id]
    }

    /// Information sets whose parent sequence is `sequence_id`.
    pub fn child_infosets(&self, sequence_id: SequenceId) -> &[InfosetId] {
        &self.child_infosets_of_seqs[sequence_id]
    }

    pub fn sequence_name(&self, sequence_id: SequenceId) -> &str {
        &self.sequence_names[sequence_id]
    }

    /// Computes a pure best response against the sequence-form payoff vector
    /// `gradient`. Returns the best-response value and the sequence-form
    /// strategy attaining it.
    pub fn best_response(&self, gradient: &[f64]) -> Result<(f64, Vec<f64>), GameError> {
        self.check_length(gradient)?;
        let mut values = gradient.to_vec();
        let mut best_actions = vec![0; self.num_infosets()];

        let mut order = (0..self.num_infosets()).collect::<Vec<_>>();
        order.sort_by_key(|&infoset_id| std::cmp::Reverse(self.infosets[infoset_id].start_sequence));

        for &infoset_id in order.iter() {
            let infoset = self.infosets[infoset_id];
            let mut best_value = std::f64::NEG_INFINITY;
            for sequence_id in infoset.sequences() {
                if best_value < values[sequence_id] {
                    best_value = values[sequence_id];
                    best_actions[infoset_id] = sequence_id;
                }
            }
            values[infoset.parent_sequence] += best_value;
        }

        let mut strategy = vec![0.0; self.num_sequences()];
        strategy[self.empty_sequence_id()] = 1.0;
        for &infoset_id in order.iter().rev() {
            let infoset = self.infosets[infoset_id];
            strategy[best_actions[infoset_id]] = strategy[infoset.parent_sequence];
        }

        Ok((values[self.empty_sequence_id()], strategy))
    }

    /// Fails unless `vector` holds one entry per sequence.
    pub fn check_length(&self, vector: &[f64]) -> Result<(), GameError> {
        if vector.len() != self.num_sequences() {
            return Err(GameError::SequenceVectorLength {
                player: self.player,
                expected: self.num_sequences(),
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod test_fixtures {
    use crate::game::test_fixtures::BET_OR_FOLD;
    use crate::game::Player;
    use crate::treeplex::Treeplex;
    use lazy_static::lazy_static;

    lazy_static! {
        pub static ref BET_OR_FOLD_TREEPLEX_PL1: Treeplex =
            Treeplex::new(&BET_OR_FOLD, Player::Player1).unwrap();
        pub static ref BET_OR_FOLD_TREEPLEX_PL2: Treeplex =
            Treeplex::new(&BET_OR_FOLD, Player::Player2).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::{BET_OR_FOLD_TREEPLEX_PL1, BET_OR_FOLD_TREEPLEX_PL2};
    use crate::game::{Action, GameError, GameTree, Infoset, Node, Player};
    use crate::treeplex::Treeplex;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn sequence_numbering() {
        let treeplex = &*BET_OR_FOLD_TREEPLEX_PL1;
        assert_eq!(treeplex.num_sequences(), 5);
        assert_eq!(treeplex.num_infosets(), 2);
        assert_eq!(treeplex.infoset(0), &Infoset::new(0, 1, 2));
        assert_eq!(treeplex.infoset(1), &Infoset::new(0, 3, 4));
        assert_eq!(treeplex.sequence_id(1, 1), 4);
        assert_eq!(treeplex.node_sequence(3), 1);
        assert_eq!(treeplex.node_sequence(10), 4);
        assert_eq!(treeplex.node_sequence(0), 0);
        assert_eq!(treeplex.parent_infoset_of_seq(0), None);
        assert_eq!(treeplex.parent_infoset_of_seq(2), Some((0, 1)));
        assert_eq!(treeplex.child_infosets(0), &[0, 1]);
        assert_eq!(treeplex.sequence_name(2), "I0.Bet");

        let treeplex = &*BET_OR_FOLD_TREEPLEX_PL2;
        assert_eq!(treeplex.num_sequences(), 3);
        assert_eq!(treeplex.node_sequence(9), 1);
        assert_eq!(treeplex.node_sequence(10), 2);
        assert!(treeplex.child_infosets(1).is_empty());
    }

    #[test]
    fn best_response() {
        let treeplex = &*BET_OR_FOLD_TREEPLEX_PL1;
        let (value, strategy) = treeplex.best_response(&[0.0, -0.5, 0.25, -0.5, 1.0]).unwrap();
        assert_approx_eq!(value, 1.25);
        assert_eq!(strategy, vec![1.0, 0.0, 1.0, 0.0, 1.0]);

        let (value, strategy) = treeplex.best_response(&[2.0, 1.0, 0.0, 0.0, 3.0]).unwrap();
        assert_approx_eq!(value, 6.0);
        assert_eq!(strategy, vec![1.0, 1.0, 0.0, 0.0, 1.0]);

        assert_eq!(
            treeplex.best_response(&[0.0, 1.0, 2.0]).unwrap_err(),
            GameError::SequenceVectorLength {
                player: Player::Player1,
                expected: 5,
                actual: 3,
            }
        );
    }

    #[test]
    fn detects_imperfect_recall() {
        // Player 1 forgets its own first move.
        let game = GameTree::new(
            vec![
                Node::decision(0, Player::Player1, 0, vec![Action::new("l", 1), Action::new("r", 2)]),
                Node::decision(1, Player::Player1, 1, vec![Action::new("a", 3)]),
                Node::decision(2, Player::Player1, 1, vec![Action::new("a", 4)]),
                Node::leaf(3, 0.0),
                Node::leaf(4, 1.0),
            ],
            0,
        )
        .unwrap();
        assert_eq!(
            Treeplex::new(&game, Player::Player1).unwrap_err(),
            GameError::ImperfectRecall {
                player: Player::Player1,
                infoset: 1
            }
        );
        assert!(Treeplex::new(&game, Player::Player2).is_ok());
    }
}
