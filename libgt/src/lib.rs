// (LIB)rary for (G)ame (T)rees.
// Games are described implicitly through `GameTreeVertex` and expanded into
// an explicit `efg_lite::game::GameTree` by `GameTreeBuilder`.

extern crate efg_lite;

pub mod builder;
pub mod die_roll_poker;
pub mod game_tree;
pub mod synthetic;

pub use builder::GameTreeBuilder;
pub use game_tree::{ChanceOrPlayer, GameTreeVertex, Leaf, VertexOrLeaf};
