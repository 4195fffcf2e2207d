//! Geometry and material resources consumed by the scene graph.

pub mod material;
pub mod mesh;
pub mod primitives;

pub use material::Material;
pub use mesh::{PolygonMesh, Topology, VertexAttribute};
