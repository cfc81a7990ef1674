use crate::game::{GameTree, Player};
use crate::treeplex::{SequenceId, Treeplex};

use std::collections::BTreeMap;

/// Sparse sequence-form payoff matrix. One entry per pair of sequences that
/// reaches at least one leaf.
#[derive(Debug, Clone)]
pub struct PayoffMatrix {
    pub entries: Vec<PayoffMatrixEntry>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PayoffMatrixEntry {
    pub seq_pl1: SequenceId,
    pub seq_pl2: SequenceId,
    pub chance_factor: f64,
    pub payoff_pl1: f64,
}

impl PayoffMatrix {
    pub fn new(entries: Vec<PayoffMatrixEntry>) -> PayoffMatrix {
        let mut payoff_matrix = PayoffMatrix { entries };
        payoff_matrix.flatten();
        payoff_matrix
    }

    /// Collects one entry per leaf of `game`, keyed by the sequences each
    /// player plays to reach it.
    pub fn from_game(game: &GameTree, treeplex_pl1: &Treeplex, treeplex_pl2: &Treeplex) -> PayoffMatrix {
        let entries = game
            .leaves()
            .map(|leaf| {
                PayoffMatrixEntry::new(
                    treeplex_pl1.node_sequence(leaf.id()),
                    treeplex_pl2.node_sequence(leaf.id()),
                    game.nature_probability(leaf.id()),
                    leaf.payoff().unwrap_or(0.0),
                )
            })
            .collect::<Vec<_>>();
        PayoffMatrix::new(entries)
    }

    /// Two leaves reached by the same pair of sequences (which happens
    /// whenever nature moves are unobserved by both players) occupy the same
    /// cell of the payoff matrix. `flatten` merges them into one entry whose
    /// chance factor is the total and whose payoff is the chance-weighted mean.
    pub fn flatten(&mut self) {
        let mut map = BTreeMap::<(SequenceId, SequenceId), PayoffMatrixEntry>::new();

        for payoff_entry in self.entries.iter() {
            let key = (payoff_entry.seq_pl1, payoff_entry.seq_pl2);
            let merged = match map.get(&key) {
                None => *payoff_entry,
                Some(old_payoff_entry) => {
                    let new_chance_factor =
                        old_payoff_entry.chance_factor + payoff_entry.chance_factor;
                    if new_chance_factor <= std::f64::EPSILON {
                        continue;
                    }
                    let expected_util_pl1 = payoff_entry.payoff_pl1 * payoff_entry.chance_factor
                        + old_payoff_entry.payoff_pl1 * old_payoff_entry.chance_factor;
                    PayoffMatrixEntry::new(
                        key.0,
                        key.1,
                        new_chance_factor,
                        expected_util_pl1 / new_chance_factor,
                    )
                }
            };
            map.insert(key, merged);
        }

        self.entries = map.values().cloned().collect::<Vec<PayoffMatrixEntry>>();
    }
}

impl PayoffMatrixEntry {
    pub fn new(
        seq_pl1: SequenceId,
        seq_pl2: SequenceId,
        chance_factor: f64,
        payoff_pl1: f64,
    ) -> PayoffMatrixEntry {
        PayoffMatrixEntry {
            seq_pl1,
            seq_pl2,
            chance_factor,
            payoff_pl1,
        }
    }

    /// Payoff of `player`; the game is zero-sum.
    pub fn payoff(&self, player: Player) -> f64 {
        match player {
            Player::Player1 => self.payoff_pl1,
            Player::Player2 => -self.payoff_pl1,
        }
    }

    pub fn sequence(&self, player: Player) -> SequenceId {
        match player {
            Player::Player1 => self.seq_pl1,
            Player::Player2 => self.seq_pl2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_fixtures::BET_OR_FOLD;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn merges_entries_sharing_sequences() {
        let matrix = PayoffMatrix::new(vec![
            PayoffMatrixEntry::new(1, 2, 0.25, 4.0),
            PayoffMatrixEntry::new(0, 0, 1.0, 1.0),
            PayoffMatrixEntry::new(1, 2, 0.75, 0.0),
        ]);
        assert_eq!(matrix.entries.len(), 2);
        assert_eq!(matrix.entries[0], PayoffMatrixEntry::new(0, 0, 1.0, 1.0));
        assert_approx_eq!(matrix.entries[1].chance_factor, 1.0);
        assert_approx_eq!(matrix.entries[1].payoff_pl1, 1.0);
        assert_approx_eq!(matrix.entries[1].payoff(Player::Player2), -1.0);
    }

    #[test]
    fn one_entry_per_leaf_of_bet_or_fold() {
        let game = &*BET_OR_FOLD;
        let treeplex_pl1 = Treeplex::new(game, Player::Player1).unwrap();
        let treeplex_pl2 = Treeplex::new(game, Player::Player2).unwrap();
        let matrix = PayoffMatrix::from_game(game, &treeplex_pl1, &treeplex_pl2);
        assert_eq!(matrix.entries.len(), 6);
        let total: f64 = matrix.entries.iter().map(|e| e.chance_factor).sum();
        assert_approx_eq!(total, 3.0);
    }
}
