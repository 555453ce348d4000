//! Grid and process-mesh topology: coordinates, neighbour directions, the
//! rank layout and the domain decomposition.

pub mod coord;
pub mod decomposition;
pub mod direction;
pub mod mesh;

pub use coord::{Axis, AxisSet, Coord, MAX_RANK};
pub use decomposition::{Decomposition, decompose};
pub use direction::{DIRECTION_COUNT, Direction};
pub use mesh::ProcessMesh;
