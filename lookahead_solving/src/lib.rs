//! Opponent models with limited lookahead.
//!
//! The opponent of the player being solved for is assumed to evaluate its
//! options with a heuristic node evaluation a fixed number of plies ahead.
//! The resulting best response of the rational player is computed by a
//! mixed-integer extension of the sequence-form linear program.

pub mod error;
pub mod evaluation;
pub mod lookahead;
pub mod sequence_form;
pub mod solution;

pub use error::LookAheadError;
pub use evaluation::NodeEvaluation;
pub use lookahead::{LookAheadConfig, LookAheadModelBuilder};
pub use sequence_form::SequenceFormModel;
pub use solution::LookAheadSolution;

#[cfg(test)]
pub(crate) mod test_fixtures;
