//! Assembly of linear and mixed-integer programs and a solver seam.
//!
//! Models are built through `Model` with an interface close to the Gurobi C
//! API (`add_constr`, `chg_coeff`, senses), then handed to any `Solver`.

#[macro_use]
extern crate approx;

mod error;
mod expression;
mod lp_format;
mod model;
mod solution;
mod solver;

pub use error::{ModelError, SolveError};
pub use expression::LinearExpr;
pub use model::{Constraint, ConstraintId, Model, ObjectiveSense, Sense, Variable, VariableInfo, VariableType};
pub use solution::Solution;
pub use solver::{MicroLpSolver, Solver};

/// Integrality tolerance: a binary variable counts as set when its value
/// exceeds `1 - EPSILON`.
pub const EPSILON: f64 = 1e-6;
