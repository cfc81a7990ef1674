use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("variable {name} has invalid bounds [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },
    #[error("non-finite coefficient in {0}")]
    NonFiniteCoefficient(String),
    #[error("unknown variable handle {0}")]
    UnknownVariable(usize),
    #[error("unknown constraint handle {0}")]
    UnknownConstraint(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("model is infeasible")]
    Infeasible,
    #[error("model is unbounded")]
    Unbounded,
    #[error("solver backend failed: {0}")]
    Backend(String),
    #[error("solution violates {0}")]
    Violation(String),
}
