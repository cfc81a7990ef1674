//! Bounded-error signal abstraction for games where each player's private
//! information is a pair of die rolls.
//!
//! The abstraction is computed by a mixed-integer program that assigns every
//! roll history to a bucket, charging each history the worst payoff swing
//! caused by sharing its bucket with another history.

pub mod abstractor;
pub mod cost;
pub mod error;
pub mod signal_abstraction;

pub use abstractor::{AbstractionConfig, AbstractionModelBuilder};
pub use cost::CostEstimator;
pub use error::AbstractionError;
pub use signal_abstraction::{SignalAbstraction, SignalHistory};
