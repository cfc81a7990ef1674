use crate::error::LookAheadError;
use efg_lite::game::{GameTree, InfosetId, PayoffMatrix, Player};
use efg_lite::treeplex::{SequenceId, Treeplex};
use optimizers::{
    ConstraintId, LinearExpr, Model, ObjectiveSense, Sense, Solution, Solver, Variable,
};

use log::debug;
use std::f64::{INFINITY, NEG_INFINITY};

/// Sequence-form linear program of a two-player zero-sum game, solved for the
/// primal `player` against a best-responding opponent (the dual player).
///
/// The primal player's realization plan `x` is constrained by the treeplex
/// flow constraints. Every opponent sequence `τ` carries one dual constraint
/// bounding the value of the information set `τ` is played at by the value of
/// continuing with `τ`. The objective maximizes the value at the root.
#[derive(Debug)]
pub struct SequenceFormModel<'a> {
    game: &'a GameTree,
    player: Player,
    treeplex_primal: Treeplex,
    treeplex_dual: Treeplex,
    payoff_matrix: PayoffMatrix,
    model: Model,

    strategy_vars: Vec<Variable>,
    root_value_var: Variable,
    dual_infoset_value_vars: Vec<Variable>,
    dual_constraints: Vec<ConstraintId>,
}

impl<'a> SequenceFormModel<'a> {
    pub fn new(game: &'a GameTree, player: Player) -> Result<SequenceFormModel<'a>, LookAheadError> {
        let treeplex_primal = Treeplex::new(game, player)?;
        let treeplex_dual = Treeplex::new(game, -player)?;
        let payoff_matrix = match player {
            Player::Player1 => PayoffMatrix::from_game(game, &treeplex_primal, &treeplex_dual),
            Player::Player2 => PayoffMatrix::from_game(game, &treeplex_dual, &treeplex_primal),
        };
        let mut model = Model::new(format!("sequence_form_{}", player));

        let mut strategy_vars = Vec::with_capacity(treeplex_primal.num_sequences());
        for seq in 0..treeplex_primal.num_sequences() {
            let name = format!("x({})", treeplex_primal.sequence_name(seq));
            strategy_vars.push(model.add_continuous_var(name, 0.0, 1.0)?);
        }
        model.fix(strategy_vars[treeplex_primal.empty_sequence_id()], 1.0)?;

        for (infoset_id, infoset) in treeplex_primal.infosets().iter().enumerate() {
            let mut flow = LinearExpr::term(-1.0, strategy_vars[infoset.parent_sequence]);
            for seq in infoset.sequences() {
                flow.add_term(1.0, strategy_vars[seq]);
            }
            model.add_constr(flow, Sense::Equal, 0.0, format!("Realization({})", infoset_id))?;
        }

        let root_value_var = model.add_continuous_var("v(root)", NEG_INFINITY, INFINITY)?;
        let dual_infoset_value_vars = (0..treeplex_dual.num_infosets())
            .map(|infoset_id| {
                model.add_continuous_var(format!("v({})", infoset_id), NEG_INFINITY, INFINITY)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Continuation value of every opponent sequence, minus the value of
        // the information set it is played at.
        let mut continuations = (0..treeplex_dual.num_sequences())
            .map(|seq| {
                let mut expr = LinearExpr::new();
                for &child in treeplex_dual.child_infosets(seq) {
                    expr.add_term(-1.0, dual_infoset_value_vars[child]);
                }
                match treeplex_dual.parent_infoset_of_seq(seq) {
                    None => expr.add_term(1.0, root_value_var),
                    Some((infoset_id, _)) => {
                        expr.add_term(1.0, dual_infoset_value_vars[infoset_id])
                    }
                }
                expr
            })
            .collect::<Vec<_>>();
        for entry in payoff_matrix.entries.iter() {
            let coeff = entry.chance_factor * entry.payoff(player);
            continuations[entry.sequence(-player)]
                .add_term(-coeff, strategy_vars[entry.sequence(player)]);
        }

        let mut dual_constraints = Vec::with_capacity(continuations.len());
        for (seq, expr) in continuations.into_iter().enumerate() {
            let name = format!("Dual({})", treeplex_dual.sequence_name(seq));
            dual_constraints.push(model.add_constr(expr, Sense::LessEqual, 0.0, name)?);
        }

        model.set_objective(LinearExpr::term(1.0, root_value_var), ObjectiveSense::Maximize)?;

        debug!(
            "Sequence form for {} with {} primal and {} dual sequences, {} payoff entries",
            player,
            treeplex_primal.num_sequences(),
            treeplex_dual.num_sequences(),
            payoff_matrix.entries.len()
        );

        Ok(SequenceFormModel {
            game,
            player,
            treeplex_primal,
            treeplex_dual,
            payoff_matrix,
            model,
            strategy_vars,
            root_value_var,
            dual_infoset_value_vars,
            dual_constraints,
        })
    }

    pub fn game(&self) -> &'a GameTree {
        self.game
    }

    /// The primal player.
    pub fn player(&self) -> Player {
        self.player
    }

    pub fn opponent(&self) -> Player {
        -self.player
    }

    pub fn primal_treeplex(&self) -> &Treeplex {
        &self.treeplex_primal
    }

    pub fn dual_treeplex(&self) -> &Treeplex {
        &self.treeplex_dual
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn strategy_var(&self, seq: SequenceId) -> Variable {
        self.strategy_vars[seq]
    }

    pub fn root_value_var(&self) -> Variable {
        self.root_value_var
    }

    pub fn dual_infoset_value_var(&self, infoset_id: InfosetId) -> Variable {
        self.dual_infoset_value_vars[infoset_id]
    }

    /// The dual constraint of an opponent sequence.
    pub fn dual_constraint(&self, seq: SequenceId) -> ConstraintId {
        self.dual_constraints[seq]
    }

    pub fn solve<S: Solver>(&self, solver: &S) -> Result<Solution, LookAheadError> {
        Ok(solver.solve(&self.model)?)
    }

    /// Sequence-form strategy of the primal player in `solution`.
    pub fn strategy(&self, solution: &Solution) -> Vec<f64> {
        self.strategy_vars
            .iter()
            .map(|&var| solution.value(var))
            .collect()
    }

    /// Value the primal player gets with the sequence-form `strategy` against
    /// an opponent playing a best response.
    pub fn best_response_value(&self, strategy: &[f64]) -> Result<f64, LookAheadError> {
        self.treeplex_primal.check_length(strategy)?;
        let mut gradient = vec![0.0; self.treeplex_dual.num_sequences()];
        for entry in self.payoff_matrix.entries.iter() {
            gradient[entry.sequence(-self.player)] -= entry.chance_factor
                * entry.payoff(self.player)
                * strategy[entry.sequence(self.player)];
        }
        let (value, _) = self.treeplex_dual.best_response(&gradient)?;
        Ok(-value)
    }
}
