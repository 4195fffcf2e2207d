#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use errors::{CanopyError, Result};
pub use renderer::{AttributeBindings, RenderBackend, SceneRenderer};
pub use resources::{Material, PolygonMesh, VertexAttribute};
pub use scene::{
    CoordinateSystem, GroupNode, LeafNode, Light, LightAttachment, SceneNode, Scenegraph,
    TransformNode, TransformStack,
};
