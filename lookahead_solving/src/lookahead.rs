/// Best responses against opponents with limited lookahead.
///
/// The opponent picks actions by looking `look_ahead` plies ahead and reading
/// a heuristic evaluation of the nodes it sees there. The sequence-form model
/// of the primal player is extended with one deactivation binary `D` per
/// opponent sequence. A deactivated sequence is never played by the opponent,
/// so its dual constraint is relaxed. An action is kept active only if its
/// heuristic value is at least as good as the one of every sibling, and
/// deactivated siblings must be worse by at least `epsilon`.
///
/// Heuristic values depend on the primal strategy: the value of a frontier
/// node `m` is `nature(m) * eval(m) * x[seq(m)]`. Along the way, the opponent
/// may meet its own information sets again; there the lookahead either picks
/// one action for the incentivized side (`inc`, gated by choice binaries) or
/// takes the maximum over actions for the dominated side (`dom`).
use crate::error::LookAheadError;
use crate::sequence_form::SequenceFormModel;
use crate::solution::LookAheadSolution;
use efg_lite::game::{GameTree, InfosetId, NodeId, Player};
use efg_lite::treeplex::SequenceId;
use optimizers::{LinearExpr, Model, Sense, Solution, Solver, Variable};

use log::{debug, info};
use std::f64::{INFINITY, NEG_INFINITY};

pub const DEFAULT_EPSILON: f64 = 0.001;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LookAheadConfig {
    /// Number of plies the opponent sees ahead, at least 1.
    pub look_ahead: usize,
    /// Margin by which an active action must beat a deactivated sibling.
    pub epsilon: f64,
}

impl Default for LookAheadConfig {
    fn default() -> LookAheadConfig {
        LookAheadConfig::new(1)
    }
}

impl LookAheadConfig {
    pub fn new(look_ahead: usize) -> LookAheadConfig {
        LookAheadConfig {
            look_ahead,
            epsilon: DEFAULT_EPSILON,
        }
    }

    pub fn with_epsilon(self, epsilon: f64) -> LookAheadConfig {
        LookAheadConfig { epsilon, ..self }
    }

    pub fn validate(&self) -> Result<(), LookAheadError> {
        if self.look_ahead == 0 {
            return Err(LookAheadError::InvalidConfig(String::from(
                "look_ahead must be at least 1",
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(LookAheadError::InvalidConfig(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Shifts an evaluation table so that it is non-negative. Tables without
/// negative entries are returned unchanged.
pub fn normalize_evaluation(evaluation: &[f64]) -> Vec<f64> {
    let min = evaluation.iter().cloned().fold(INFINITY, f64::min);
    if min < 0.0 {
        evaluation.iter().map(|value| value - min).collect()
    } else {
        evaluation.to_vec()
    }
}

#[derive(Debug)]
pub struct LookAheadModelBuilder<'a> {
    base: SequenceFormModel<'a>,
    config: LookAheadConfig,
    evaluation: Vec<f64>,
    min_payoff: f64,
    max_payoff: f64,

    // Largest evaluation the opponent can see after each of its sequences.
    max_evaluation: Vec<f64>,

    deactivation_vars: Vec<Variable>,
    lookahead_vars: Vec<Variable>,
    infoset_value_vars: Vec<Variable>,
}

impl<'a> LookAheadModelBuilder<'a> {
    /// Builds the complete model for `player` against an opponent using the
    /// node `evaluation` table (indexed by node id).
    pub fn build(
        game: &'a GameTree,
        player: Player,
        evaluation: &[f64],
        config: LookAheadConfig,
    ) -> Result<LookAheadModelBuilder<'a>, LookAheadError> {
        config.validate()?;
        if evaluation.len() != game.num_nodes() {
            return Err(LookAheadError::InvalidConfig(format!(
                "evaluation table has {} entries for {} nodes",
                evaluation.len(),
                game.num_nodes()
            )));
        }
        if let Some(node_id) = evaluation.iter().position(|value| !value.is_finite()) {
            return Err(LookAheadError::InvalidConfig(format!(
                "evaluation of node {} is not finite",
                node_id
            )));
        }

        let base = SequenceFormModel::new(game, player)?;
        let (min_payoff, max_payoff) = game.payoff_bounds();
        let mut builder = LookAheadModelBuilder {
            base,
            config,
            evaluation: normalize_evaluation(evaluation),
            min_payoff,
            max_payoff,
            max_evaluation: vec![],
            deactivation_vars: vec![],
            lookahead_vars: vec![],
            infoset_value_vars: vec![],
        };

        builder.compute_max_evaluation();
        builder.create_variables()?;
        builder.relax_dual_constraints()?;
        builder.add_deactivation_propagation()?;
        builder.add_lookahead_choices()?;
        builder.add_incentive_constraints()?;

        let empty = builder.base.dual_treeplex().empty_sequence_id();
        let root_deactivation = builder.deactivation_vars[empty];
        builder.base.model_mut().fix(root_deactivation, 0.0)?;

        info!(
            "Lookahead model for {} (look_ahead {}): {} variables ({} binary), {} constraints",
            player,
            config.look_ahead,
            builder.model().num_vars(),
            builder.model().num_binary_vars(),
            builder.model().num_constrs()
        );
        Ok(builder)
    }

    pub fn solve<S: Solver>(&self, solver: &S) -> Result<LookAheadSolution, LookAheadError> {
        let solution = self.base.solve(solver)?;
        Ok(self.extract_solution(&solution))
    }

    pub fn extract_solution(&self, solution: &Solution) -> LookAheadSolution {
        LookAheadSolution {
            objective_value: solution.objective_value(),
            strategy: self.base.strategy(solution),
            deactivated: self
                .deactivation_vars
                .iter()
                .map(|&var| solution.is_set(var))
                .collect(),
            infoset_values: self
                .infoset_value_vars
                .iter()
                .map(|&var| solution.value(var))
                .collect(),
        }
    }

    pub fn sequence_form(&self) -> &SequenceFormModel<'a> {
        &self.base
    }

    pub fn model(&self) -> &Model {
        self.base.model()
    }

    pub fn config(&self) -> &LookAheadConfig {
        &self.config
    }

    /// The normalized evaluation table.
    pub fn evaluation(&self) -> &[f64] {
        &self.evaluation
    }

    pub fn payoff_bounds(&self) -> (f64, f64) {
        (self.min_payoff, self.max_payoff)
    }

    pub fn max_evaluation(&self, seq: SequenceId) -> f64 {
        self.max_evaluation[seq]
    }

    pub fn deactivation_var(&self, seq: SequenceId) -> Variable {
        self.deactivation_vars[seq]
    }

    pub fn lookahead_var(&self, seq: SequenceId) -> Variable {
        self.lookahead_vars[seq]
    }

    pub fn infoset_value_var(&self, infoset_id: InfosetId) -> Variable {
        self.infoset_value_vars[infoset_id]
    }

    fn is_frontier(&self, node_id: NodeId, depth: usize) -> bool {
        depth == self.config.look_ahead || self.base.game().is_leaf(node_id)
    }

    fn compute_max_evaluation(&mut self) {
        let game = self.base.game();
        let opponent = self.base.opponent();
        let treeplex = self.base.dual_treeplex();

        let mut max_evaluation = vec![0.0; treeplex.num_sequences()];
        self.max_evaluation_below(
            game.root(),
            0,
            &mut max_evaluation[treeplex.empty_sequence_id()],
        );
        for (infoset_id, infoset) in treeplex.infosets().iter().enumerate() {
            for &member in game.information_set_members(opponent, infoset_id) {
                for (action_index, action) in game.node(member).actions().iter().enumerate() {
                    let seq = infoset.start_sequence + action_index;
                    self.max_evaluation_below(action.child(), 1, &mut max_evaluation[seq]);
                }
            }
        }
        self.max_evaluation = max_evaluation;
    }

    fn max_evaluation_below(&self, node_id: NodeId, depth: usize, max: &mut f64) {
        if self.is_frontier(node_id, depth) {
            *max = f64::max(*max, self.evaluation[node_id]);
            return;
        }
        for action in self.base.game().node(node_id).actions() {
            self.max_evaluation_below(action.child(), depth + 1, max);
        }
    }

    fn create_variables(&mut self) -> Result<(), LookAheadError> {
        let treeplex = self.base.dual_treeplex();
        let names = (0..treeplex.num_sequences())
            .map(|seq| treeplex.sequence_name(seq).to_string())
            .collect::<Vec<_>>();
        let num_infosets = treeplex.num_infosets();

        let model = self.base.model_mut();
        self.deactivation_vars = names
            .iter()
            .map(|name| model.add_binary_var(format!("D({})", name)))
            .collect();
        self.lookahead_vars = names
            .iter()
            .map(|name| model.add_binary_var(format!("T({})", name)))
            .collect();
        self.infoset_value_vars = (0..num_infosets)
            .map(|infoset_id| {
                model.add_continuous_var(format!("V({})", infoset_id), NEG_INFINITY, INFINITY)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    /// A deactivated sequence no longer bounds the value of its information
    /// set: `max_payoff - min_payoff` covers any gap between two values.
    fn relax_dual_constraints(&mut self) -> Result<(), LookAheadError> {
        let big_m = self.max_payoff - self.min_payoff;
        let empty = self.base.dual_treeplex().empty_sequence_id();
        for seq in 0..self.deactivation_vars.len() {
            if seq == empty {
                continue;
            }
            let constr = self.base.dual_constraint(seq);
            let var = self.deactivation_vars[seq];
            self.base.model_mut().chg_coeff(constr, var, -big_m)?;
        }
        Ok(())
    }

    /// Sequences below a deactivated sequence are deactivated, and an
    /// information set reached by an active sequence keeps one active action.
    fn add_deactivation_propagation(&mut self) -> Result<(), LookAheadError> {
        let game = self.base.game();
        let opponent = self.base.opponent();
        let empty = self.base.dual_treeplex().empty_sequence_id();
        let mut visited = vec![false; self.base.dual_treeplex().num_infosets()];

        let mut stack: Vec<(NodeId, Variable)> =
            vec![(game.root(), self.deactivation_vars[empty])];
        while let Some((node_id, parent)) = stack.pop() {
            let node = game.node(node_id);
            let infoset_id = match node.infoset_of(opponent) {
                None => {
                    for action in node.actions() {
                        stack.push((action.child(), parent));
                    }
                    continue;
                }
                Some(infoset_id) => infoset_id,
            };

            let start = self.base.dual_treeplex().infoset(infoset_id).start_sequence;
            if !visited[infoset_id] {
                visited[infoset_id] = true;
                let mut total = LinearExpr::term(-1.0, parent);
                for seq in start..start + node.actions().len() {
                    let var = self.deactivation_vars[seq];
                    total.add_term(1.0, var);

                    let mut inherit = LinearExpr::term(1.0, var);
                    inherit.add_term(-1.0, parent);
                    let name = format!(
                        "DeactivationInherit({})",
                        self.base.dual_treeplex().sequence_name(seq)
                    );
                    self.base
                        .model_mut()
                        .add_constr(inherit, Sense::GreaterEqual, 0.0, name)?;
                }
                let num_actions = node.actions().len() as f64;
                self.base.model_mut().add_constr(
                    total,
                    Sense::LessEqual,
                    num_actions - 1.0,
                    format!("DeactivationPropagation({})", infoset_id),
                )?;
            }

            for (action_index, action) in node.actions().iter().enumerate() {
                stack.push((action.child(), self.deactivation_vars[start + action_index]));
            }
        }
        Ok(())
    }

    fn add_lookahead_choices(&mut self) -> Result<(), LookAheadError> {
        for seq in 0..self.deactivation_vars.len() {
            let mut expr = LinearExpr::term(1.0, self.lookahead_vars[seq]);
            expr.add_term(1.0, self.deactivation_vars[seq]);
            let name = format!(
                "LookAheadChoice({})",
                self.base.dual_treeplex().sequence_name(seq)
            );
            self.base
                .model_mut()
                .add_constr(expr, Sense::Equal, 1.0, name)?;
        }
        Ok(())
    }

    fn add_incentive_constraints(&mut self) -> Result<(), LookAheadError> {
        let epsilon = self.config.epsilon;
        for infoset_id in 0..self.base.dual_treeplex().num_infosets() {
            let infoset = *self.base.dual_treeplex().infoset(infoset_id);
            let num_actions = infoset.num_actions();

            let mut incentivized = Vec::with_capacity(num_actions);
            for action_index in 0..num_actions {
                incentivized.push(self.incentivized_expression(infoset_id, action_index)?);
            }
            // Built once per action and shared by every ordered pair.
            let mut dominated = Vec::with_capacity(num_actions);
            for action_index in 0..num_actions {
                dominated.push(self.dominated_expression(infoset_id, action_index)?);
            }

            for (a, inc) in incentivized.iter().enumerate() {
                let seq_a = infoset.start_sequence + a;
                let d_a = self.deactivation_vars[seq_a];
                for (b, dom) in dominated.iter().enumerate() {
                    if a == b {
                        continue;
                    }
                    let seq_b = infoset.start_sequence + b;
                    let d_b = self.deactivation_vars[seq_b];
                    let big_m = self.max_evaluation[seq_b];
                    let label = format!(
                        "{};{}",
                        self.base.dual_treeplex().sequence_name(seq_a),
                        self.base.dual_treeplex().sequence_name(seq_b)
                    );

                    // inc(a) >= dom(b) + (M + eps) D_b - (M + eps) D_a - M
                    let mut incentive = inc.clone();
                    incentive.add_expr(dom, -1.0);
                    incentive.add_term(-(big_m + epsilon), d_b);
                    incentive.add_term(big_m + epsilon, d_a);
                    self.base.model_mut().add_constr(
                        incentive,
                        Sense::GreaterEqual,
                        -big_m,
                        format!("Incentive({})", label),
                    )?;

                    // inc(a) >= dom(b) - M D_a - M D_b
                    let mut tie = inc.clone();
                    tie.add_expr(dom, -1.0);
                    tie.add_term(big_m, d_a);
                    tie.add_term(big_m, d_b);
                    self.base.model_mut().add_constr(
                        tie,
                        Sense::GreaterEqual,
                        0.0,
                        format!("Tie({})", label),
                    )?;
                }
            }

            let big_m = infoset
                .sequences()
                .map(|seq| self.max_evaluation[seq])
                .fold(0.0, f64::max);
            let value = self.infoset_value_vars[infoset_id];
            for (a, (inc, dom)) in incentivized.iter().zip(dominated.iter()).enumerate() {
                let seq = infoset.start_sequence + a;
                let d_a = self.deactivation_vars[seq];
                let name = self.base.dual_treeplex().sequence_name(seq).to_string();

                let mut upper = LinearExpr::term(1.0, value);
                upper.add_expr(inc, -1.0);
                upper.add_term(-big_m, d_a);
                self.base.model_mut().add_constr(
                    upper,
                    Sense::LessEqual,
                    0.0,
                    format!("InfosetValueUpper({})", name),
                )?;

                let mut lower = LinearExpr::term(1.0, value);
                lower.add_expr(dom, -1.0);
                lower.add_term(big_m, d_a);
                self.base.model_mut().add_constr(
                    lower,
                    Sense::GreaterEqual,
                    0.0,
                    format!("InfosetValueLower({})", name),
                )?;
            }
        }
        debug!(
            "Incentive constraints added for {} opponent information sets",
            self.base.dual_treeplex().num_infosets()
        );
        Ok(())
    }

    /// Heuristic value the opponent gets for playing the action at
    /// `action_index`, zero when the action is deactivated.
    fn incentivized_expression(
        &mut self,
        infoset_id: InfosetId,
        action_index: usize,
    ) -> Result<LinearExpr, LookAheadError> {
        let game = self.base.game();
        let opponent = self.base.opponent();
        let seq = self.base.dual_treeplex().sequence_id(infoset_id, action_index);
        let label = format!("inc;{}", self.base.dual_treeplex().sequence_name(seq));
        let gate = self.lookahead_vars[seq];

        let mut choices: Vec<Option<Vec<Variable>>> =
            vec![None; self.base.dual_treeplex().num_infosets()];
        let mut expr = LinearExpr::new();
        for &member in game.information_set_members(opponent, infoset_id) {
            let child = game.node(member).actions()[action_index].child();
            self.fill_incentivized(child, 1, gate, &label, &mut choices, &mut expr)?;
        }
        Ok(expr)
    }

    fn fill_incentivized(
        &mut self,
        node_id: NodeId,
        depth: usize,
        gate: Variable,
        label: &str,
        choices: &mut Vec<Option<Vec<Variable>>>,
        expr: &mut LinearExpr,
    ) -> Result<(), LookAheadError> {
        let game = self.base.game();
        let node = game.node(node_id);

        if self.is_frontier(node_id, depth) {
            let coeff = game.nature_probability(node_id) * self.evaluation[node_id];
            if coeff == 0.0 {
                return Ok(());
            }
            let strategy_var = self
                .base
                .strategy_var(self.base.primal_treeplex().node_sequence(node_id));
            let model = self.base.model_mut();
            let node_value =
                model.add_continuous_var(format!("NodeVal({};{})", label, node_id), 0.0, INFINITY)?;

            let mut by_strategy = LinearExpr::term(1.0, node_value);
            by_strategy.add_term(-coeff, strategy_var);
            model.add_constr(
                by_strategy,
                Sense::LessEqual,
                0.0,
                format!("NodeValStrategy({};{})", label, node_id),
            )?;

            let mut by_gate = LinearExpr::term(1.0, node_value);
            by_gate.add_term(-coeff, gate);
            model.add_constr(
                by_gate,
                Sense::LessEqual,
                0.0,
                format!("NodeValGate({};{})", label, node_id),
            )?;

            expr.add_term(1.0, node_value);
            return Ok(());
        }

        let inner = match node.infoset_of(self.base.opponent()) {
            None => {
                for action in node.actions() {
                    self.fill_incentivized(action.child(), depth + 1, gate, label, choices, expr)?;
                }
                return Ok(());
            }
            Some(inner) => inner,
        };

        // One choice per information set, shared by all of its members.
        let existing = choices[inner].clone();
        let inner_choices = match existing {
            Some(vars) => vars,
            None => {
                let model = self.base.model_mut();
                let vars = node
                    .actions()
                    .iter()
                    .map(|action| {
                        model.add_binary_var(format!("Choice({};{};{})", label, inner, action.name()))
                    })
                    .collect::<Vec<_>>();
                let mut total = LinearExpr::term(-1.0, gate);
                for &var in vars.iter() {
                    total.add_term(1.0, var);
                }
                model.add_constr(
                    total,
                    Sense::Equal,
                    0.0,
                    format!("ChoiceSum({};{})", label, inner),
                )?;
                choices[inner] = Some(vars.clone());
                vars
            }
        };
        for (action, &choice) in node.actions().iter().zip(inner_choices.iter()) {
            self.fill_incentivized(action.child(), depth + 1, choice, label, choices, expr)?;
        }
        Ok(())
    }

    /// Largest heuristic value the opponent could get for playing the action
    /// at `action_index`.
    fn dominated_expression(
        &mut self,
        infoset_id: InfosetId,
        action_index: usize,
    ) -> Result<LinearExpr, LookAheadError> {
        let game = self.base.game();
        let opponent = self.base.opponent();
        let seq = self.base.dual_treeplex().sequence_id(infoset_id, action_index);
        let label = format!("dom;{}", self.base.dual_treeplex().sequence_name(seq));

        // Branch 0 is the action's own value; every inner information set
        // owns the branches of its actions.
        let mut branches = vec![LinearExpr::new()];
        let mut inner: Vec<Option<(Variable, usize)>> =
            vec![None; self.base.dual_treeplex().num_infosets()];
        for &member in game.information_set_members(opponent, infoset_id) {
            let child = game.node(member).actions()[action_index].child();
            self.fill_dominated(child, 1, 0, &label, &mut inner, &mut branches)?;
        }

        for (inner_id, entry) in inner.iter().enumerate() {
            if let Some((value_var, start)) = *entry {
                let num_actions = self.base.dual_treeplex().infoset(inner_id).num_actions();
                for branch in start..start + num_actions {
                    let mut expr = LinearExpr::term(1.0, value_var);
                    expr.add_expr(&branches[branch], -1.0);
                    self.base.model_mut().add_constr(
                        expr,
                        Sense::GreaterEqual,
                        0.0,
                        format!("Dominated({};{};{})", label, inner_id, branch - start),
                    )?;
                }
            }
        }
        Ok(branches.swap_remove(0))
    }

    fn fill_dominated(
        &mut self,
        node_id: NodeId,
        depth: usize,
        branch: usize,
        label: &str,
        inner: &mut Vec<Option<(Variable, usize)>>,
        branches: &mut Vec<LinearExpr>,
    ) -> Result<(), LookAheadError> {
        let game = self.base.game();
        let node = game.node(node_id);

        if self.is_frontier(node_id, depth) {
            let coeff = game.nature_probability(node_id) * self.evaluation[node_id];
            if coeff != 0.0 {
                let strategy_var = self
                    .base
                    .strategy_var(self.base.primal_treeplex().node_sequence(node_id));
                branches[branch].add_term(coeff, strategy_var);
            }
            return Ok(());
        }

        let inner_id = match node.infoset_of(self.base.opponent()) {
            None => {
                for action in node.actions() {
                    self.fill_dominated(action.child(), depth + 1, branch, label, inner, branches)?;
                }
                return Ok(());
            }
            Some(inner_id) => inner_id,
        };

        let existing = inner[inner_id];
        let start = match existing {
            Some((_, start)) => start,
            None => {
                let value_var = self.base.model_mut().add_continuous_var(
                    format!("W({};{})", label, inner_id),
                    0.0,
                    INFINITY,
                )?;
                branches[branch].add_term(1.0, value_var);
                let start = branches.len();
                branches.resize(start + node.actions().len(), LinearExpr::new());
                inner[inner_id] = Some((value_var, start));
                start
            }
        };
        for (action_index, action) in node.actions().iter().enumerate() {
            self.fill_dominated(action.child(), depth + 1, start + action_index, label, inner, branches)?;
        }
        Ok(())
    }
}
