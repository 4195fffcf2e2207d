//! Scene tree nodes.
//!
//! A scene is a strict tree of [`SceneNode`]s in one of three variants:
//!
//! - [`GroupNode`]: an ordered list of children, no transform of its own.
//!   The only variant that owns light attachments directly.
//! - [`TransformNode`]: exactly one optional child plus a static transform
//!   and a separately settable animation transform. The single-child
//!   invariant lives in the type (`Option<Box<SceneNode>>`), not in a
//!   runtime check.
//! - [`LeafNode`]: geometry. Holds a mesh name resolved through the
//!   renderer's mesh table at draw time, a material, and an optional
//!   texture name. Structurally childless.
//!
//! Both per-frame operations ([`draw`] and [`light_pass`]) are recursive
//! walks threading the same [`TransformStack`] by `&mut`; transform nodes
//! open a stack frame through the RAII guard so the pop happens on every
//! exit path.
//!
//! [`draw`]: SceneNode::draw
//! [`light_pass`]: SceneNode::light_pass

use glam::Mat4;

use crate::errors::{CanopyError, Result};
use crate::renderer::{RenderBackend, SceneRenderer};
use crate::resources::Material;
use crate::scene::graph::LightMap;
use crate::scene::light::{CoordinateSystem, Light, LightAttachment};
use crate::scene::stack::TransformStack;

/// A node of the scene tree.
#[derive(Debug)]
pub enum SceneNode {
    Group(GroupNode),
    Transform(TransformNode),
    Leaf(LeafNode),
}

impl SceneNode {
    /// The node's name. Names key the scenegraph's light map and node
    /// lookup; they are not required to be unique (lookups are
    /// first-match-wins in traversal order).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Group(g) => &g.name,
            SceneNode::Transform(t) => &t.name,
            SceneNode::Leaf(l) => &l.name,
        }
    }

    /// Attaches `child` to this node.
    ///
    /// Groups take any number of children. A transform node takes exactly
    /// one: a second call fails with [`CanopyError::ChildOccupied`] and
    /// leaves the existing child untouched. Leaves always fail.
    pub fn add_child(&mut self, child: SceneNode) -> Result<()> {
        match self {
            SceneNode::Group(g) => {
                g.add_child(child);
                Ok(())
            }
            SceneNode::Transform(t) => t.add_child(child),
            SceneNode::Leaf(l) => Err(CanopyError::LeafChild(l.name.clone())),
        }
    }

    /// Finds the first node named `name` in this subtree, in pre-order:
    /// self, then children in list order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name() == name {
            return Some(self);
        }
        match self {
            SceneNode::Group(g) => g.children.iter().find_map(|c| c.find(name)),
            SceneNode::Transform(t) => t.child.as_deref().and_then(|c| c.find(name)),
            SceneNode::Leaf(_) => None,
        }
    }

    /// Mutable variant of [`find`](SceneNode::find); hosts use it to drive
    /// animation transforms by node name.
    #[must_use]
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name() == name {
            return Some(self);
        }
        match self {
            SceneNode::Group(g) => g.children.iter_mut().find_map(|c| c.find_mut(name)),
            SceneNode::Transform(t) => t.child.as_deref_mut().and_then(|c| c.find_mut(name)),
            SceneNode::Leaf(_) => None,
        }
    }

    /// Deep-copies the subtree rooted at this node.
    ///
    /// Cloned groups start with no attached lights; transform matrices and
    /// leaf mesh/material/texture references are copied.
    #[must_use]
    pub fn clone_subtree(&self) -> SceneNode {
        match self {
            SceneNode::Group(g) => SceneNode::Group(GroupNode {
                name: g.name.clone(),
                children: g.children.iter().map(SceneNode::clone_subtree).collect(),
                lights: Vec::new(),
            }),
            SceneNode::Transform(t) => SceneNode::Transform(TransformNode {
                name: t.name.clone(),
                transform: t.transform,
                animation_transform: t.animation_transform,
                child: t
                    .child
                    .as_deref()
                    .map(|c| Box::new(c.clone_subtree())),
            }),
            SceneNode::Leaf(l) => SceneNode::Leaf(LeafNode {
                name: l.name.clone(),
                mesh_name: l.mesh_name.clone(),
                material: l.material.clone(),
                texture_name: l.texture_name.clone(),
            }),
        }
    }

    /// Draw-pass walk of this subtree.
    ///
    /// Groups delegate to each child in order on the inherited frame;
    /// transform nodes compose `animation_transform * transform` into a new
    /// frame for their child; leaves issue their draw call on the frame
    /// left by their ancestors.
    pub fn draw<B: RenderBackend>(
        &self,
        renderer: &mut SceneRenderer<B>,
        stack: &mut TransformStack,
    ) -> Result<()> {
        match self {
            SceneNode::Group(g) => {
                for child in &g.children {
                    child.draw(renderer, stack)?;
                }
                Ok(())
            }
            SceneNode::Transform(t) => {
                let mut frame = stack.pushed(t.animation_transform * t.transform);
                if let Some(child) = t.child.as_deref() {
                    child.draw(renderer, &mut frame)?;
                }
                Ok(())
            }
            SceneNode::Leaf(l) => {
                if l.mesh_name.is_empty() {
                    return Ok(());
                }
                renderer.draw_mesh(
                    &l.mesh_name,
                    &l.material,
                    l.texture_name.as_deref(),
                    stack.top(),
                )
            }
        }
    }

    /// Light-pass walk of this subtree.
    ///
    /// Collects every object-space light into `lights`, converted into the
    /// frame accumulated at the owning node. Templates are cloned before
    /// transforming. Append order is the deterministic pre-order walk;
    /// shaders index lights positionally, so this order is load-bearing.
    pub fn light_pass(
        &self,
        stack: &mut TransformStack,
        light_map: &LightMap,
        lights: &mut Vec<LightAttachment>,
    ) {
        match self {
            SceneNode::Group(g) => {
                // A group contributes no transform, so its own lights ride
                // on whatever frame the ancestors accumulated.
                for attachment in &g.lights {
                    if attachment.coordinate_system == CoordinateSystem::Object {
                        lights.push(LightAttachment {
                            light: attachment.light.transformed(stack.top()),
                            coordinate_system: attachment.coordinate_system,
                        });
                    }
                }
                for child in &g.children {
                    child.light_pass(stack, light_map, lights);
                }
            }
            SceneNode::Transform(t) => {
                let mut frame = stack.pushed(t.animation_transform * t.transform);
                // Lights registered under this node's name travel with the
                // freshly composed frame, animation included.
                collect_named(&t.name, frame.top(), light_map, lights);
                if let Some(child) = t.child.as_deref() {
                    child.light_pass(&mut frame, light_map, lights);
                }
            }
            SceneNode::Leaf(l) => {
                collect_named(&l.name, stack.top(), light_map, lights);
            }
        }
    }
}

/// Clones and converts every light registered under `name`, appending to
/// `lights` in attachment order.
fn collect_named(
    name: &str,
    frame: Mat4,
    light_map: &LightMap,
    lights: &mut Vec<LightAttachment>,
) {
    let Some(attachments) = light_map.get(name) else {
        return;
    };
    for attachment in attachments {
        lights.push(LightAttachment {
            light: attachment.light.transformed(frame),
            coordinate_system: attachment.coordinate_system,
        });
    }
}

/// A logical grouping of nodes; children may be of any variant.
#[derive(Debug)]
pub struct GroupNode {
    pub name: String,
    children: Vec<SceneNode>,
    lights: Vec<LightAttachment>,
}

impl GroupNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Appends a child; groups have no upper bound, zero children is fine.
    pub fn add_child(&mut self, child: impl Into<SceneNode>) {
        self.children.push(child.into());
    }

    /// Attaches an object-space light directly to this group.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(LightAttachment::object(light));
    }

    #[must_use]
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    #[must_use]
    pub fn lights(&self) -> &[LightAttachment] {
        &self.lights
    }
}

/// A change of coordinate frame with exactly one child.
///
/// The composed local frame is `animation_transform * transform`: the
/// animation applies in the parent frame (offset first), the static
/// transform innermost (orient relative to that offset).
#[derive(Debug)]
pub struct TransformNode {
    pub name: String,
    transform: Mat4,
    animation_transform: Mat4,
    child: Option<Box<SceneNode>>,
}

impl TransformNode {
    /// Both matrices default to identity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            animation_transform: Mat4::IDENTITY,
            child: None,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Attaches the single child. Fails with [`CanopyError::ChildOccupied`]
    /// if one is already present; the existing child is left untouched.
    pub fn add_child(&mut self, child: impl Into<SceneNode>) -> Result<()> {
        if self.child.is_some() {
            return Err(CanopyError::ChildOccupied(self.name.clone()));
        }
        self.child = Some(Box::new(child.into()));
        Ok(())
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn set_animation_transform(&mut self, transform: Mat4) {
        self.animation_transform = transform;
    }

    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    #[must_use]
    pub fn animation_transform(&self) -> Mat4 {
        self.animation_transform
    }

    #[must_use]
    pub fn child(&self) -> Option<&SceneNode> {
        self.child.as_deref()
    }
}

/// The only node variant carrying geometry.
#[derive(Debug)]
pub struct LeafNode {
    pub name: String,
    mesh_name: String,
    material: Material,
    texture_name: Option<String>,
}

impl LeafNode {
    /// `mesh_name` is resolved through the renderer's mesh table at draw
    /// time; an empty name makes the leaf a no-op draw.
    #[must_use]
    pub fn new(name: impl Into<String>, mesh_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh_name: mesh_name.into(),
            material: Material::default(),
            texture_name: None,
        }
    }

    #[must_use]
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    #[must_use]
    pub fn with_texture(mut self, texture_name: impl Into<String>) -> Self {
        self.texture_name = Some(texture_name.into());
        self
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    #[must_use]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[must_use]
    pub fn mesh_name(&self) -> &str {
        &self.mesh_name
    }

    #[must_use]
    pub fn texture_name(&self) -> Option<&str> {
        self.texture_name.as_deref()
    }
}

impl From<GroupNode> for SceneNode {
    fn from(node: GroupNode) -> Self {
        SceneNode::Group(node)
    }
}

impl From<TransformNode> for SceneNode {
    fn from(node: TransformNode) -> Self {
        SceneNode::Transform(node)
    }
}

impl From<LeafNode> for SceneNode {
    fn from(node: LeafNode) -> Self {
        SceneNode::Leaf(node)
    }
}
