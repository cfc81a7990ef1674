use crate::model::Variable;
use crate::solution::Solution;

use std::collections::BTreeMap;

/// A linear expression `Σ coeff · var + constant`. Terms on the same variable
/// may repeat until `compact` merges them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Variable, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> LinearExpr {
        LinearExpr::default()
    }

    pub fn term(coeff: f64, var: Variable) -> LinearExpr {
        LinearExpr {
            terms: vec![(var, coeff)],
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, coeff: f64, var: Variable) {
        self.terms.push((var, coeff));
    }

    pub fn add_constant(&mut self, constant: f64) {
        self.constant += constant;
    }

    /// Adds `multiplier · other` to this expression.
    pub fn add_expr(&mut self, other: &LinearExpr, multiplier: f64) {
        self.terms
            .extend(other.terms.iter().map(|&(var, coeff)| (var, coeff * multiplier)));
        self.constant += other.constant * multiplier;
    }

    pub fn terms(&self) -> &[(Variable, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Merges terms on the same variable, drops zero coefficients and sorts
    /// terms by variable.
    pub fn compact(&mut self) {
        let mut merged = BTreeMap::<Variable, f64>::new();
        for &(var, coeff) in self.terms.iter() {
            *merged.entry(var).or_insert(0.0) += coeff;
        }
        self.terms = merged.into_iter().filter(|&(_, coeff)| coeff != 0.0).collect();
    }

    pub fn evaluate(&self, solution: &Solution) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coeff)| coeff * solution.value(var))
            .sum::<f64>()
            + self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn compact_merges_and_drops() {
        let mut model = Model::new("expr");
        let x = model.add_binary_var("x");
        let y = model.add_binary_var("y");

        let mut expr = LinearExpr::term(2.0, y);
        expr.add_term(1.0, x);
        expr.add_term(-2.0, y);
        expr.add_term(0.5, x);
        expr.add_constant(3.0);
        expr.compact();
        assert_eq!(expr.terms(), &[(x, 1.5)]);
        assert_approx_eq!(expr.constant(), 3.0);
    }

    #[test]
    fn add_expr_scales() {
        let mut model = Model::new("expr");
        let x = model.add_binary_var("x");
        let mut inner = LinearExpr::term(2.0, x);
        inner.add_constant(1.0);

        let mut outer = LinearExpr::new();
        outer.add_expr(&inner, -3.0);
        assert_eq!(outer.terms(), &[(x, -6.0)]);
        assert_approx_eq!(outer.constant(), -3.0);

        let solution = Solution::new(0.0, vec![1.0]);
        assert_approx_eq!(outer.evaluate(&solution), -9.0);
    }
}
