use crate::error::SolveError;
use crate::model::{Model, ObjectiveSense, Sense, VariableType};
use crate::solution::Solution;
use crate::EPSILON;

use log::{debug, info};
use microlp::{ComparisonOp, OptimizationDirection, Problem};

/// Anything able to solve a `Model` to optimality.
pub trait Solver {
    fn solve(&self, model: &Model) -> Result<Solution, SolveError>;
}

/// Pure-Rust simplex with branch-and-bound for binary variables.
#[derive(Debug, Clone, Default)]
pub struct MicroLpSolver {}

impl MicroLpSolver {
    pub fn new() -> MicroLpSolver {
        MicroLpSolver {}
    }

    fn translate(model: &Model) -> Result<(Problem, Vec<microlp::Variable>), SolveError> {
        let direction = match model.objective_sense() {
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
        };
        let mut problem = Problem::new(direction);

        let mut objective_coeffs = vec![0.0; model.num_vars()];
        for &(var, coeff) in model.objective().terms() {
            objective_coeffs[var.index()] += coeff;
        }

        let mut variables = Vec::with_capacity(model.num_vars());
        for (info, &coeff) in model.variables().iter().zip(objective_coeffs.iter()) {
            let var = match info.var_type {
                VariableType::Continuous => problem.add_var(coeff, (info.lower, info.upper)),
                VariableType::Binary => problem.add_integer_var(
                    coeff,
                    (info.lower.round() as i32, info.upper.round() as i32),
                ),
            };
            variables.push(var);
        }

        for constraint in model.constraints() {
            if constraint.lhs.is_empty() {
                // Only the right-hand side remains; check it directly.
                if !constraint.is_satisfied(0.0, EPSILON) {
                    debug!("Constraint {} has no terms and cannot hold", constraint.name);
                    return Err(SolveError::Infeasible);
                }
                continue;
            }
            let mut expr = microlp::LinearExpr::empty();
            for &(var, coeff) in constraint.lhs.terms() {
                expr.add(variables[var.index()], coeff);
            }
            let op = match constraint.sense {
                Sense::LessEqual => ComparisonOp::Le,
                Sense::GreaterEqual => ComparisonOp::Ge,
                Sense::Equal => ComparisonOp::Eq,
            };
            problem.add_constraint(expr, op, constraint.rhs);
        }

        Ok((problem, variables))
    }
}

impl Solver for MicroLpSolver {
    fn solve(&self, model: &Model) -> Result<Solution, SolveError> {
        info!(
            "Solving {} with {:?} variables ({:?} binary) and {:?} constraints",
            model.name(),
            model.num_vars(),
            model.num_binary_vars(),
            model.num_constrs()
        );
        let (problem, variables) = Self::translate(model)?;
        let solution = problem.solve().map_err(|e| match e {
            microlp::Error::Infeasible => SolveError::Infeasible,
            microlp::Error::Unbounded => SolveError::Unbounded,
            other => SolveError::Backend(other.to_string()),
        })?;

        let values = variables.iter().map(|&var| solution[var]).collect::<Vec<f64>>();
        let objective_value = solution.objective() + model.objective().constant();
        debug!("Objective value of {}: {}", model.name(), objective_value);
        Ok(Solution::new(objective_value, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinearExpr;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn solves_small_lp() {
        // max x + 2y  s.t.  x + y <= 4, y <= 3
        let mut model = Model::new("lp");
        let x = model.add_continuous_var("x", 0.0, std::f64::INFINITY).unwrap();
        let y = model.add_continuous_var("y", 0.0, 3.0).unwrap();
        let mut lhs = LinearExpr::term(1.0, x);
        lhs.add_term(1.0, y);
        model.add_constr(lhs, Sense::LessEqual, 4.0, "cap").unwrap();
        let mut objective = LinearExpr::term(1.0, x);
        objective.add_term(2.0, y);
        objective.add_constant(0.5);
        model.set_objective(objective, ObjectiveSense::Maximize).unwrap();

        let solution = MicroLpSolver::new().solve(&model).unwrap();
        assert_approx_eq!(solution.objective_value(), 7.5);
        assert_approx_eq!(solution.value(x), 1.0);
        assert_approx_eq!(solution.value(y), 3.0);
        assert!(solution.verify(&model, 1e-6).is_ok());
    }

    #[test]
    fn solves_knapsack_with_binaries() {
        // max 5a + 4b + 3c  s.t.  2a + 3b + 2c <= 4
        let mut model = Model::new("knapsack");
        let items = [(5.0, 2.0), (4.0, 3.0), (3.0, 2.0)];
        let vars = (0..items.len())
            .map(|i| model.add_binary_var(format!("item{}", i)))
            .collect::<Vec<_>>();
        let mut weight = LinearExpr::new();
        let mut value = LinearExpr::new();
        for (var, &(v, w)) in vars.iter().zip(items.iter()) {
            weight.add_term(w, *var);
            value.add_term(v, *var);
        }
        model.add_constr(weight, Sense::LessEqual, 4.0, "weight").unwrap();
        model.set_objective(value, ObjectiveSense::Maximize).unwrap();

        let solution = MicroLpSolver::new().solve(&model).unwrap();
        assert_approx_eq!(solution.objective_value(), 8.0);
        assert!(solution.is_set(vars[0]));
        assert!(!solution.is_set(vars[1]));
        assert!(solution.is_set(vars[2]));
    }

    #[test]
    fn reports_infeasibility() {
        let mut model = Model::new("infeasible");
        let x = model.add_binary_var("x");
        model.add_constr(LinearExpr::term(1.0, x), Sense::GreaterEqual, 2.0, "too_big").unwrap();
        assert_eq!(MicroLpSolver::new().solve(&model), Err(SolveError::Infeasible));

        let mut model = Model::new("empty_row");
        let x = model.add_binary_var("x");
        let mut lhs = LinearExpr::term(1.0, x);
        lhs.add_term(-1.0, x);
        model.add_constr(lhs, Sense::GreaterEqual, 1.0, "zero").unwrap();
        assert_eq!(MicroLpSolver::new().solve(&model), Err(SolveError::Infeasible));
    }

    #[test]
    fn fixed_binary_is_respected() {
        let mut model = Model::new("fixed");
        let x = model.add_binary_var("x");
        model.fix(x, 0.0).unwrap();
        model.set_objective(LinearExpr::term(1.0, x), ObjectiveSense::Maximize).unwrap();
        let solution = MicroLpSolver::new().solve(&model).unwrap();
        assert_approx_eq!(solution.objective_value(), 0.0);
        assert!(!solution.is_set(x));
    }
}
