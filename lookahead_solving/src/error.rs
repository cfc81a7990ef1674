use efg_lite::game::GameError;
use optimizers::{ModelError, SolveError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookAheadError {
    #[error("invalid lookahead configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}
