//! Scene graph module
//!
//! Manages the retained scene hierarchy and the per-frame traversals:
//! - [`SceneNode`]: the tree element (group / transform / leaf variants)
//! - [`TransformStack`]: the modelview stack shared by both tree walks
//! - [`Light`] / [`LightAttachment`]: light data and its authored frame
//! - [`Scenegraph`]: scene container (root, mesh table, light map)
//! - [`overlay`]: wireframe bounding-volume tree for debug display

pub mod graph;
pub mod light;
pub mod node;
pub mod overlay;
pub mod stack;

pub use graph::{LightMap, Scenegraph};
pub use light::{CoordinateSystem, Light, LightAttachment};
pub use node::{GroupNode, LeafNode, SceneNode, TransformNode};
pub use stack::{FrameScope, TransformStack};
