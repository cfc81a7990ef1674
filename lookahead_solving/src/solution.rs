use efg_lite::game::InfosetId;
use efg_lite::treeplex::{SequenceId, Treeplex};

/// Result of solving a limited-lookahead model.
#[derive(Debug, Clone, PartialEq)]
pub struct LookAheadSolution {
    pub objective_value: f64,
    /// Sequence-form strategy of the primal player.
    pub strategy: Vec<f64>,
    /// Per opponent sequence, whether the opponent is modelled as never playing it.
    pub deactivated: Vec<bool>,
    /// Heuristic value of the active actions, per opponent information set.
    pub infoset_values: Vec<f64>,
}

impl LookAheadSolution {
    pub fn is_deactivated(&self, seq: SequenceId) -> bool {
        self.deactivated[seq]
    }

    pub fn active_sequences<'a>(&'a self) -> impl Iterator<Item = SequenceId> + 'a {
        self.deactivated
            .iter()
            .enumerate()
            .filter(|(_, &deactivated)| !deactivated)
            .map(|(seq, _)| seq)
    }

    pub fn infoset_value(&self, infoset_id: InfosetId) -> f64 {
        self.infoset_values[infoset_id]
    }

    /// Checks top-down over the opponent's treeplex that the empty sequence
    /// is active, that every sequence extending a deactivated sequence is
    /// deactivated, and that an information set reached by an active
    /// sequence keeps at least one active action.
    pub fn verify_deactivation_propagation(&self, treeplex_dual: &Treeplex) -> bool {
        if self.deactivated.len() != treeplex_dual.num_sequences()
            || self.deactivated[treeplex_dual.empty_sequence_id()]
        {
            return false;
        }

        let mut order = (0..treeplex_dual.num_infosets()).collect::<Vec<_>>();
        order.sort_by_key(|&infoset_id| treeplex_dual.infoset(infoset_id).start_sequence);
        order.into_iter().all(|infoset_id| {
            let infoset = treeplex_dual.infoset(infoset_id);
            if self.deactivated[infoset.parent_sequence] {
                infoset.sequences().all(|seq| self.deactivated[seq])
            } else {
                infoset.sequences().any(|seq| !self.deactivated[seq])
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::DEEP_TRAP;
    use efg_lite::game::Player;

    fn solution(deactivated: Vec<bool>) -> LookAheadSolution {
        LookAheadSolution {
            objective_value: 0.0,
            strategy: vec![1.0, 1.0, 0.0],
            deactivated,
            infoset_values: vec![0.0, 0.0],
        }
    }

    #[test]
    fn test_propagation_check() {
        let treeplex = Treeplex::new(&DEEP_TRAP, Player::Player2).unwrap();
        // root, a1, a2, b1, b2
        assert!(solution(vec![false; 5]).verify_deactivation_propagation(&treeplex));
        assert!(solution(vec![false, true, false, true, true])
            .verify_deactivation_propagation(&treeplex));
        assert!(!solution(vec![false, true, false, false, true])
            .verify_deactivation_propagation(&treeplex));
        assert!(!solution(vec![false, true, true, true, true])
            .verify_deactivation_propagation(&treeplex));
        assert!(!solution(vec![true; 5]).verify_deactivation_propagation(&treeplex));
        assert!(!solution(vec![false; 3]).verify_deactivation_propagation(&treeplex));
    }

    #[test]
    fn test_active_sequences() {
        let solution = solution(vec![false, true, false, true, true]);
        assert_eq!(solution.active_sequences().collect::<Vec<_>>(), vec![0, 2]);
        assert!(solution.is_deactivated(3));
    }
}
