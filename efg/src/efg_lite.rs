#[macro_use]
extern crate approx;

pub mod game;
pub mod treeplex;
