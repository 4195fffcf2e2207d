//! Wireframe bounding-volume overlay.
//!
//! Debug display support: builds an alternate root tree in which every
//! transform node of the source tree becomes a wireframe box carrying that
//! node's accumulated frame. The host swaps it in with
//! [`Scenegraph::set_root`] and swaps the real tree back when done.
//!
//! [`Scenegraph::set_root`]: crate::scene::Scenegraph::set_root

use crate::resources::Material;
use crate::scene::node::{GroupNode, LeafNode, SceneNode, TransformNode};
use crate::scene::stack::TransformStack;

/// Builds the bounds tree for `root`.
///
/// `wire_mesh` names the line-topology box mesh to instance (see
/// [`PolygonMesh::wireframe`]); it must be registered with the renderer
/// separately. Each emitted box bakes the source node's full accumulated
/// `animation_transform * transform` chain, so the overlay matches what the
/// draw pass actually produced for the frame it was built in.
///
/// [`PolygonMesh::wireframe`]: crate::resources::PolygonMesh::wireframe
#[must_use]
pub fn bounds_overlay(root: &SceneNode, wire_mesh: &str, material: &Material) -> SceneNode {
    let mut boxes = GroupNode::new("bounds");
    let mut stack = TransformStack::new();
    collect(root, &mut stack, &mut boxes, wire_mesh, material);
    SceneNode::Group(boxes)
}

fn collect(
    node: &SceneNode,
    stack: &mut TransformStack,
    out: &mut GroupNode,
    wire_mesh: &str,
    material: &Material,
) {
    match node {
        SceneNode::Group(g) => {
            for child in g.children() {
                collect(child, stack, out, wire_mesh, material);
            }
        }
        SceneNode::Transform(t) => {
            let mut frame = stack.pushed(t.animation_transform() * t.transform());

            let mut wrapper = TransformNode::new(format!("{}-bounds", t.name))
                .with_transform(frame.top());
            let leaf = LeafNode::new(format!("{}-bounds-box", t.name), wire_mesh)
                .with_material(material.clone());
            // A freshly built transform node always accepts its first child.
            let _ = wrapper.add_child(leaf);
            out.add_child(wrapper);

            if let Some(child) = t.child() {
                collect(child, &mut frame, out, wire_mesh, material);
            }
        }
        SceneNode::Leaf(_) => {}
    }
}
