use crate::error::ModelError;
use crate::expression::LinearExpr;
use crate::lp_format;

use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Handle to a variable of a `Model`, valid only for the model that created it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(pub(crate) usize);

impl Variable {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub(crate) usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VariableType {
    Continuous,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub var_type: VariableType,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sense {
    LessEqual,
    GreaterEqual,
    Equal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectiveSense {
    Minimize,
    Maximize,
}

/// A linear constraint `lhs sense rhs`. The constant of the expression passed
/// to `Model::add_constr` is folded into `rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub lhs: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// Whether the constraint holds for `lhs_value` up to `tolerance`.
    pub fn is_satisfied(&self, lhs_value: f64, tolerance: f64) -> bool {
        match self.sense {
            Sense::LessEqual => lhs_value <= self.rhs + tolerance,
            Sense::GreaterEqual => lhs_value >= self.rhs - tolerance,
            Sense::Equal => abs_diff_eq!(lhs_value, self.rhs, epsilon = tolerance),
        }
    }
}

/// A (mixed-integer) linear program under construction.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    variables: Vec<VariableInfo>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    objective_sense: ObjectiveSense,
}

impl Model {
    pub fn new<S: Into<String>>(name: S) -> Model {
        Model {
            name: name.into(),
            variables: vec![],
            constraints: vec![],
            objective: LinearExpr::new(),
            objective_sense: ObjectiveSense::Minimize,
        }
    }

    /// Adds a continuous variable in `[lower, upper]`. Infinite bounds are
    /// allowed, e.g. `(-INFINITY, INFINITY)` for a free variable.
    pub fn add_continuous_var<S: Into<String>>(
        &mut self,
        name: S,
        lower: f64,
        upper: f64,
    ) -> Result<Variable, ModelError> {
        let name = name.into();
        if lower.is_nan() || upper.is_nan() || lower > upper || lower == std::f64::INFINITY {
            return Err(ModelError::InvalidBounds { name, lower, upper });
        }
        Ok(self.push_variable(VariableInfo {
            name,
            lower,
            upper,
            var_type: VariableType::Continuous,
        }))
    }

    pub fn add_binary_var<S: Into<String>>(&mut self, name: S) -> Variable {
        self.push_variable(VariableInfo {
            name: name.into(),
            lower: 0.0,
            upper: 1.0,
            var_type: VariableType::Binary,
        })
    }

    fn push_variable(&mut self, info: VariableInfo) -> Variable {
        self.variables.push(info);
        Variable(self.variables.len() - 1)
    }

    /// Fixes a variable to `value` by collapsing its bounds.
    pub fn fix(&mut self, var: Variable, value: f64) -> Result<(), ModelError> {
        let info = self
            .variables
            .get_mut(var.0)
            .ok_or(ModelError::UnknownVariable(var.0))?;
        if !value.is_finite() {
            return Err(ModelError::NonFiniteCoefficient(info.name.clone()));
        }
        info.lower = value;
        info.upper = value;
        Ok(())
    }

    pub fn add_constr<S: Into<String>>(
        &mut self,
        mut lhs: LinearExpr,
        sense: Sense,
        rhs: f64,
        name: S,
    ) -> Result<ConstraintId, ModelError> {
        let name = name.into();
        self.check_expr(&lhs, &name)?;
        if !rhs.is_finite() {
            return Err(ModelError::NonFiniteCoefficient(name));
        }
        let rhs = rhs - lhs.constant();
        lhs.add_constant(-lhs.constant());
        lhs.compact();
        self.constraints.push(Constraint {
            name,
            lhs,
            sense,
            rhs,
        });
        Ok(ConstraintId(self.constraints.len() - 1))
    }

    /// Sets the coefficient of `var` in a constraint, replacing any existing one.
    pub fn chg_coeff(
        &mut self,
        constr: ConstraintId,
        var: Variable,
        coeff: f64,
    ) -> Result<(), ModelError> {
        if var.0 >= self.variables.len() {
            return Err(ModelError::UnknownVariable(var.0));
        }
        let constraint = self
            .constraints
            .get_mut(constr.0)
            .ok_or(ModelError::UnknownConstraint(constr.0))?;
        if !coeff.is_finite() {
            return Err(ModelError::NonFiniteCoefficient(constraint.name.clone()));
        }
        let mut lhs = LinearExpr::new();
        for &(other, other_coeff) in constraint.lhs.terms() {
            if other != var {
                lhs.add_term(other_coeff, other);
            }
        }
        lhs.add_term(coeff, var);
        lhs.compact();
        constraint.lhs = lhs;
        Ok(())
    }

    pub fn set_objective(
        &mut self,
        mut expr: LinearExpr,
        sense: ObjectiveSense,
    ) -> Result<(), ModelError> {
        self.check_expr(&expr, "objective")?;
        expr.compact();
        self.objective = expr;
        self.objective_sense = sense;
        Ok(())
    }

    fn check_expr(&self, expr: &LinearExpr, name: &str) -> Result<(), ModelError> {
        for &(var, coeff) in expr.terms() {
            if var.0 >= self.variables.len() {
                return Err(ModelError::UnknownVariable(var.0));
            }
            if !coeff.is_finite() {
                return Err(ModelError::NonFiniteCoefficient(name.to_string()));
            }
        }
        if !expr.constant().is_finite() {
            return Err(ModelError::NonFiniteCoefficient(name.to_string()));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constrs(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable(&self, var: Variable) -> &VariableInfo {
        &self.variables[var.0]
    }

    pub fn variables(&self) -> &[VariableInfo] {
        &self.variables
    }

    pub fn constraint(&self, constr: ConstraintId) -> &Constraint {
        &self.constraints[constr.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn objective_sense(&self) -> ObjectiveSense {
        self.objective_sense
    }

    pub fn num_binary_vars(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.var_type == VariableType::Binary)
            .count()
    }

    /// Writes the model in CPLEX LP format.
    pub fn write_lp<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        lp_format::write(self, writer)
    }

    pub fn write_lp_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        debug!("Writing model {} to {:?}", self.name, path.as_ref());
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_lp(&mut writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_constant_moves_to_rhs() {
        let mut model = Model::new("test");
        let x = model.add_continuous_var("x", 0.0, 10.0).unwrap();
        let mut lhs = LinearExpr::term(2.0, x);
        lhs.add_constant(3.0);
        let c = model.add_constr(lhs, Sense::LessEqual, 5.0, "c").unwrap();
        assert_eq!(model.constraint(c).lhs.terms(), &[(x, 2.0)]);
        assert_eq!(model.constraint(c).rhs, 2.0);
        assert_eq!(model.constraint(c).lhs.constant(), 0.0);
    }

    #[test]
    fn chg_coeff_replaces() {
        let mut model = Model::new("test");
        let x = model.add_binary_var("x");
        let y = model.add_binary_var("y");
        let mut lhs = LinearExpr::term(1.0, x);
        lhs.add_term(1.0, x);
        let c = model.add_constr(lhs, Sense::GreaterEqual, 1.0, "c").unwrap();
        model.chg_coeff(c, x, 3.0).unwrap();
        model.chg_coeff(c, y, -1.0).unwrap();
        assert_eq!(model.constraint(c).lhs.terms(), &[(x, 3.0), (y, -1.0)]);
        assert_eq!(
            model.chg_coeff(ConstraintId(4), y, 1.0),
            Err(ModelError::UnknownConstraint(4))
        );
    }

    #[test]
    fn rejects_bad_input() {
        let mut model = Model::new("test");
        assert!(model.add_continuous_var("x", 1.0, 0.0).is_err());
        assert!(model.add_continuous_var("x", std::f64::NAN, 0.0).is_err());
        let x = model.add_binary_var("x");
        assert_eq!(
            model.add_constr(LinearExpr::term(std::f64::INFINITY, x), Sense::Equal, 0.0, "c"),
            Err(ModelError::NonFiniteCoefficient("c".to_string()))
        );
        assert_eq!(
            model.set_objective(LinearExpr::term(1.0, Variable(3)), ObjectiveSense::Minimize),
            Err(ModelError::UnknownVariable(3))
        );
        assert_eq!(model.fix(Variable(7), 0.0), Err(ModelError::UnknownVariable(7)));
    }
}
