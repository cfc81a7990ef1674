/// Defines the main components used to specify an entire game tree.

mod vertex;

pub use efg_lite::game::ChanceOrPlayer;
pub use vertex::GameTreeVertex;
pub use vertex::Leaf;
pub use vertex::VertexOrLeaf;
