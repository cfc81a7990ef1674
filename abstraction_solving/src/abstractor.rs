use crate::cost::CostEstimator;
use crate::error::AbstractionError;
use crate::signal_abstraction::{SignalAbstraction, SignalHistory};

use efg_lite::game::GameTree;
use itertools::Itertools;
use libgt::die_roll_poker::DieRollPoker;
use libgt::GameTreeBuilder;
use log::{debug, info};
use optimizers::{LinearExpr, Model, ObjectiveSense, Sense, Solution, Solver, Variable};

#[derive(Debug, Clone, PartialEq)]
pub struct AbstractionConfig {
    pub num_sides: usize,
    pub num_buckets: usize,
    pub largest_payoff: f64,
    /// Probability of each die face, uniform when `None`.
    pub side_probabilities: Option<Vec<f64>>,
    /// Restricts the history at row-major position `h` to buckets `0..=h`.
    /// Bucket labels are interchangeable, so the optimum is unaffected.
    pub break_symmetry: bool,
}

impl AbstractionConfig {
    pub fn new(num_sides: usize, num_buckets: usize, largest_payoff: f64) -> AbstractionConfig {
        AbstractionConfig {
            num_sides,
            num_buckets,
            largest_payoff,
            side_probabilities: None,
            break_symmetry: true,
        }
    }

    /// Takes the payoff scale from the largest payoff magnitude of `game`.
    pub fn for_game(game: &GameTree, num_sides: usize, num_buckets: usize) -> AbstractionConfig {
        AbstractionConfig::new(num_sides, num_buckets, game.largest_payoff())
    }

    /// Takes the payoff scale from die-roll poker played with `num_sides`
    /// dice. The configuration is checked before the game is expanded.
    pub fn for_die_roll_poker(
        num_sides: usize,
        num_buckets: usize,
    ) -> Result<AbstractionConfig, AbstractionError> {
        AbstractionConfig::new(num_sides, num_buckets, 0.0).validate()?;
        let drp = DieRollPoker::new(num_sides);
        let game = GameTreeBuilder::new().make_game(&drp.initial_state())?;
        debug!("Die-roll poker has {:?} nodes", game.num_nodes());
        Ok(AbstractionConfig::for_game(&game, num_sides, num_buckets))
    }

    /// Smallest number of buckets that always admits a lossless abstraction,
    /// one per possible sum.
    pub fn lossless_num_buckets(num_sides: usize) -> usize {
        (2 * num_sides).saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), AbstractionError> {
        if self.num_sides == 0 {
            return Err(AbstractionError::InvalidConfig("num_sides must be positive".into()));
        }
        if self.num_buckets == 0 {
            return Err(AbstractionError::InvalidConfig("num_buckets must be positive".into()));
        }
        if !self.largest_payoff.is_finite() || self.largest_payoff < 0.0 {
            return Err(AbstractionError::InvalidConfig(format!(
                "largest_payoff must be finite and non-negative, got {}",
                self.largest_payoff
            )));
        }
        if let Some(probabilities) = &self.side_probabilities {
            if probabilities.len() != self.num_sides {
                return Err(AbstractionError::InvalidConfig(format!(
                    "expected {} side probabilities, got {}",
                    self.num_sides,
                    probabilities.len()
                )));
            }
            let total: f64 = probabilities.iter().sum();
            if probabilities.iter().any(|&p| !(p >= 0.0)) || (total - 1.0).abs() > 1e-6 {
                return Err(AbstractionError::InvalidConfig(
                    "side probabilities must be non-negative and sum to one".into(),
                ));
            }
        }
        Ok(())
    }

    fn estimator(&self) -> CostEstimator {
        match &self.side_probabilities {
            Some(probabilities) => {
                CostEstimator::with_side_probabilities(probabilities.clone(), self.largest_payoff)
            }
            None => CostEstimator::new(self.num_sides, self.largest_payoff),
        }
    }
}

/// Builds and solves the bucket-assignment program of a signal abstraction.
///
/// Histories are indexed in row-major order, `(first - 1) * num_sides + (second - 1)`.
/// Assignment variables `B(f;s;b)` live in one flat vector indexed by
/// `history * num_buckets + bucket`, cost variables `Cost(f;s)` by history.
#[derive(Debug)]
pub struct AbstractionModelBuilder {
    config: AbstractionConfig,
    model: Option<Model>,
    assignment: Vec<Variable>,
    costs: Vec<Variable>,
    solution: Option<Solution>,
}

impl AbstractionModelBuilder {
    pub fn new(config: AbstractionConfig) -> AbstractionModelBuilder {
        AbstractionModelBuilder {
            config,
            model: None,
            assignment: vec![],
            costs: vec![],
            solution: None,
        }
    }

    pub fn config(&self) -> &AbstractionConfig {
        &self.config
    }

    fn num_histories(&self) -> usize {
        self.config.num_sides * self.config.num_sides
    }

    fn history(&self, history_index: usize) -> SignalHistory {
        let num_sides = self.config.num_sides;
        (history_index / num_sides + 1, history_index % num_sides + 1)
    }

    fn history_index(&self, (first, second): SignalHistory) -> usize {
        (first - 1) * self.config.num_sides + (second - 1)
    }

    fn assignment_var(&self, history_index: usize, bucket: usize) -> Variable {
        self.assignment[history_index * self.config.num_buckets + bucket]
    }

    /// Creates every variable and constraint. Calling it again is a no-op.
    pub fn build_model(&mut self) -> Result<(), AbstractionError> {
        if self.model.is_some() {
            return Ok(());
        }
        self.config.validate()?;

        let num_histories = self.num_histories();
        let num_buckets = self.config.num_buckets;
        let mut model = Model::new("signal_abstraction");

        let mut assignment = Vec::with_capacity(num_histories * num_buckets);
        let mut costs = Vec::with_capacity(num_histories);
        for history_index in 0..num_histories {
            let (first, second) = self.history(history_index);
            let mut one_bucket = LinearExpr::new();
            for bucket in 0..num_buckets {
                let var = model.add_binary_var(format!("B({};{};{})", first, second, bucket));
                if self.config.break_symmetry && bucket > history_index {
                    model.fix(var, 0.0)?;
                }
                one_bucket.add_term(1.0, var);
                assignment.push(var);
            }
            model.add_constr(
                one_bucket,
                Sense::Equal,
                1.0,
                format!("OneBucket({};{})", first, second),
            )?;
            costs.push(model.add_continuous_var(
                format!("Cost({};{})", first, second),
                0.0,
                2.0 * self.config.largest_payoff,
            )?);
        }
        self.assignment = assignment;
        self.costs = costs;

        let estimator = self.config.estimator();
        let mut num_pair_constraints = 0;
        for (a, b) in (0..num_histories).tuple_combinations::<(usize, usize)>() {
            let (first_a, second_a) = self.history(a);
            let (first_b, second_b) = self.history(b);
            let cost = estimator.cost(first_a, second_a, first_b, second_b);
            if cost <= 0.0 {
                continue;
            }
            for bucket in 0..num_buckets {
                // History `a` cannot use buckets above its own index.
                if self.config.break_symmetry && bucket > a {
                    break;
                }
                for &charged in [a, b].iter() {
                    let mut expr = LinearExpr::term(cost, self.assignment_var(a, bucket));
                    expr.add_term(cost, self.assignment_var(b, bucket));
                    expr.add_constant(-cost);
                    expr.add_term(-1.0, self.costs[charged]);
                    let (first_c, second_c) = self.history(charged);
                    model.add_constr(
                        expr,
                        Sense::LessEqual,
                        0.0,
                        format!(
                            "PairCost({};{}|{};{}|{})->({};{})",
                            first_a, second_a, first_b, second_b, bucket, first_c, second_c
                        ),
                    )?;
                    num_pair_constraints += 1;
                }
            }
        }

        let mut objective = LinearExpr::new();
        for &cost in self.costs.iter() {
            objective.add_term(1.0, cost);
        }
        model.set_objective(objective, ObjectiveSense::Minimize)?;

        debug!(
            "Abstraction model: {} histories, {} buckets, {} pair constraints",
            num_histories, num_buckets, num_pair_constraints
        );
        self.model = Some(model);
        Ok(())
    }

    /// Builds the model if needed, solves it and returns the total cost.
    pub fn solve<S: Solver>(&mut self, solver: &S) -> Result<f64, AbstractionError> {
        self.build_model()?;
        self.solution = None;
        let model = self.model.as_ref().ok_or(AbstractionError::NotSolved)?;
        let solution = solver.solve(model)?;
        let objective_value = solution.objective_value();
        info!("Abstraction cost: {}", objective_value);
        self.solution = Some(solution);
        Ok(objective_value)
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn objective_value(&self) -> Result<f64, AbstractionError> {
        self.solution
            .as_ref()
            .map(|solution| solution.objective_value())
            .ok_or(AbstractionError::NotSolved)
    }

    /// Bucket of a history in the solved model, `None` if no assignment
    /// variable reads as set.
    pub fn bucket_of(&self, history: SignalHistory) -> Result<Option<usize>, AbstractionError> {
        let solution = self.solution.as_ref().ok_or(AbstractionError::NotSolved)?;
        let num_sides = self.config.num_sides;
        if history.0 < 1 || history.0 > num_sides || history.1 < 1 || history.1 > num_sides {
            return Ok(None);
        }
        let history_index = self.history_index(history);
        Ok((0..self.config.num_buckets)
            .find(|&bucket| solution.is_set(self.assignment_var(history_index, bucket))))
    }

    /// Reads the solved assignment. Within each bucket, the first history in
    /// row-major order becomes the canonical one.
    pub fn extract_abstraction(&self) -> Result<SignalAbstraction, AbstractionError> {
        let solution = self.solution.as_ref().ok_or(AbstractionError::NotSolved)?;

        let mut buckets = vec![Vec::<SignalHistory>::new(); self.config.num_buckets];
        for (bucket, members) in buckets.iter_mut().enumerate() {
            for history_index in 0..self.num_histories() {
                if solution.is_set(self.assignment_var(history_index, bucket)) {
                    members.push(self.history(history_index));
                }
            }
        }

        let signal_names = (1..=self.config.num_sides).map(|side| side.to_string()).collect();
        let mut abstraction = SignalAbstraction::new(signal_names);
        for members in buckets.iter() {
            if let Some(&canonical) = members.first() {
                for &member in members.iter() {
                    abstraction.add_abstraction(canonical, member);
                }
            }
        }
        debug!("Extracted {} abstraction classes", abstraction.num_classes());
        Ok(abstraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use optimizers::MicroLpSolver;

    fn solve(config: AbstractionConfig) -> AbstractionModelBuilder {
        let mut builder = AbstractionModelBuilder::new(config);
        builder.solve(&MicroLpSolver::new()).unwrap();
        builder
    }

    fn check_partition(builder: &AbstractionModelBuilder) -> SignalAbstraction {
        let abstraction = builder.extract_abstraction().unwrap();
        let num_sides = builder.config().num_sides;
        assert_eq!(abstraction.len(), num_sides * num_sides);
        for (canonical, member) in abstraction.iter() {
            assert_eq!(abstraction.canonical(canonical), Some(canonical));
            assert_eq!(abstraction.canonical(member), Some(canonical));
            assert_eq!(builder.bucket_of(member), builder.bucket_of(canonical));
        }
        abstraction
    }

    #[test]
    fn lossless_bucket_count_costs_nothing() {
        for num_sides in 1..=3 {
            let num_buckets = AbstractionConfig::lossless_num_buckets(num_sides);
            let builder = solve(AbstractionConfig::new(num_sides, num_buckets, 1.0));
            assert_approx_eq!(builder.objective_value().unwrap(), 0.0);
            check_partition(&builder);
        }
    }

    #[test]
    fn surplus_buckets_cost_nothing() {
        for &(num_sides, num_buckets) in [(1, 2), (2, 5), (3, 6)].iter() {
            assert!(num_buckets > AbstractionConfig::lossless_num_buckets(num_sides));
            let builder = solve(AbstractionConfig::new(num_sides, num_buckets, 1.0));
            assert_approx_eq!(builder.objective_value().unwrap(), 0.0);
            let abstraction = check_partition(&builder);
            assert!(abstraction.num_classes() <= AbstractionConfig::lossless_num_buckets(num_sides));
        }
    }

    #[test]
    fn three_sides_five_buckets() {
        let builder = solve(AbstractionConfig::new(3, 5, 2.0));
        assert_approx_eq!(builder.objective_value().unwrap(), 0.0);
        let abstraction = check_partition(&builder);
        // A lossless abstraction only merges histories with equal sums.
        for (canonical, member) in abstraction.iter() {
            assert_eq!(canonical.0 + canonical.1, member.0 + member.1);
        }
    }

    #[test]
    fn three_sides_three_buckets() {
        let builder = solve(AbstractionConfig::new(3, 3, 1.0));
        assert!(builder.objective_value().unwrap() > 1e-6);
        let abstraction = check_partition(&builder);
        assert!(abstraction.num_classes() <= 3);
    }

    #[test]
    fn two_sides_two_buckets_optimum() {
        // Sums 2, 3, 3, 4 in two buckets: merging {2, 3, 3} (or {3, 3, 4})
        // charges 0.75 to each of three histories.
        let builder = solve(AbstractionConfig::new(2, 2, 1.0));
        assert_approx_eq!(builder.objective_value().unwrap(), 2.25);
        let abstraction = check_partition(&builder);
        assert_eq!(abstraction.num_classes(), 2);

        // Either optimum keeps the two sum-3 histories together and isolates
        // one extreme sum.
        let classes = abstraction.classes();
        let mut sizes = classes.values().map(|members| members.len()).collect::<Vec<_>>();
        sizes.sort();
        assert_eq!(sizes, vec![1, 3]);
        assert_eq!(abstraction.canonical((1, 2)), abstraction.canonical((2, 1)));
        let singleton = classes
            .values()
            .find(|members| members.len() == 1)
            .unwrap()[0];
        assert!(singleton == (1, 1) || singleton == (2, 2));
    }

    #[test]
    fn symmetry_breaking_keeps_optimum() {
        let mut config = AbstractionConfig::new(2, 2, 1.0);
        config.break_symmetry = false;
        let builder = solve(config);
        assert_approx_eq!(builder.objective_value().unwrap(), 2.25);
        check_partition(&builder);
    }

    #[test]
    fn canonical_is_first_in_row_major_order() {
        let builder = solve(AbstractionConfig::new(2, 3, 1.0));
        let abstraction = check_partition(&builder);
        for (canonical, member) in abstraction.iter() {
            assert!(canonical <= member);
        }
    }

    #[test]
    fn build_is_idempotent() {
        let mut builder = AbstractionModelBuilder::new(AbstractionConfig::new(2, 2, 1.0));
        builder.build_model().unwrap();
        let num_vars = builder.model().unwrap().num_vars();
        let num_constrs = builder.model().unwrap().num_constrs();
        builder.build_model().unwrap();
        assert_eq!(builder.model().unwrap().num_vars(), num_vars);
        assert_eq!(builder.model().unwrap().num_constrs(), num_constrs);
        assert_eq!(num_vars, 4 * 2 + 4);
    }

    #[test]
    fn queries_before_solve_fail() {
        let mut builder = AbstractionModelBuilder::new(AbstractionConfig::new(2, 2, 1.0));
        builder.build_model().unwrap();
        assert_eq!(builder.extract_abstraction().unwrap_err(), AbstractionError::NotSolved);
        assert_eq!(builder.objective_value().unwrap_err(), AbstractionError::NotSolved);
        assert_eq!(builder.bucket_of((1, 1)).unwrap_err(), AbstractionError::NotSolved);
    }

    #[test]
    fn die_roll_poker_payoff_scale() {
        let config = AbstractionConfig::for_die_roll_poker(2, 3).unwrap();
        assert_approx_eq!(config.largest_payoff, 7.0);
        assert_eq!((config.num_sides, config.num_buckets), (2, 3));

        match AbstractionConfig::for_die_roll_poker(0, 1) {
            Err(AbstractionError::InvalidConfig(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        match AbstractionConfig::for_die_roll_poker(2, 0) {
            Err(AbstractionError::InvalidConfig(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_configs_are_rejected_before_building() {
        for config in vec![
            AbstractionConfig::new(0, 2, 1.0),
            AbstractionConfig::new(2, 0, 1.0),
            AbstractionConfig::new(2, 2, std::f64::NAN),
            AbstractionConfig {
                side_probabilities: Some(vec![0.5, 0.4]),
                ..AbstractionConfig::new(2, 2, 1.0)
            },
        ] {
            let mut builder = AbstractionModelBuilder::new(config);
            match builder.build_model() {
                Err(AbstractionError::InvalidConfig(_)) => {}
                other => panic!("unexpected {:?}", other),
            }
            assert!(builder.model().is_none());
        }
    }
}
