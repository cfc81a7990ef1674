use crate::error::SolveError;
use crate::model::{Model, Variable};
use crate::EPSILON;

/// Variable assignment returned by a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    objective_value: f64,
    values: Vec<f64>,
}

impl Solution {
    pub fn new(objective_value: f64, values: Vec<f64>) -> Solution {
        Solution {
            objective_value,
            values,
        }
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    pub fn value(&self, var: Variable) -> f64 {
        self.values[var.index()]
    }

    /// Whether a binary variable is set, i.e. its value exceeds `1 - EPSILON`.
    pub fn is_set(&self, var: Variable) -> bool {
        self.value(var) > 1.0 - EPSILON
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Checks bounds, integrality and every constraint of `model` up to
    /// `tolerance`, reporting the first violation by name.
    pub fn verify(&self, model: &Model, tolerance: f64) -> Result<(), SolveError> {
        if self.values.len() != model.num_vars() {
            return Err(SolveError::Violation(format!(
                "variable count ({} values for {} variables)",
                self.values.len(),
                model.num_vars()
            )));
        }
        for (info, &value) in model.variables().iter().zip(self.values.iter()) {
            if value < info.lower - tolerance || value > info.upper + tolerance {
                return Err(SolveError::Violation(format!("bounds of {}", info.name)));
            }
            if info.var_type == crate::VariableType::Binary
                && !abs_diff_eq!(value, value.round(), epsilon = tolerance)
            {
                return Err(SolveError::Violation(format!("integrality of {}", info.name)));
            }
        }
        for constraint in model.constraints() {
            if !constraint.is_satisfied(constraint.lhs.evaluate(self), tolerance) {
                return Err(SolveError::Violation(constraint.name.clone()));
            }
        }
        Ok(())
    }
}
