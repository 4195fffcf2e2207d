//! Scene container.
//!
//! [`Scenegraph`] owns the active node tree plus the name-keyed side tables:
//! the mesh table, the texture path table, and the light map. The light map
//! attaches object-space lights to *named* nodes, so construction sites can
//! wire lights without holding a reference into the tree.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{CanopyError, Result};
use crate::renderer::{RenderBackend, SceneRenderer};
use crate::resources::PolygonMesh;
use crate::scene::light::{Light, LightAttachment};
use crate::scene::node::SceneNode;
use crate::scene::stack::TransformStack;

/// Node-name → ordered attachment list. Keys hold object-space lights only;
/// attachment order is collection order.
pub type LightMap = FxHashMap<String, Vec<LightAttachment>>;

/// A retained scene: one optional root tree and the tables shared across
/// root swaps.
///
/// The graph exclusively owns its tree (strictly a tree by construction:
/// children are owned values, never shared). Node lookup by name is an
/// on-demand pre-order search from the root; first match wins.
#[derive(Debug, Default)]
pub struct Scenegraph {
    root: Option<SceneNode>,
    meshes: FxHashMap<String, PolygonMesh>,
    textures: FxHashMap<String, String>,
    light_map: LightMap,
}

impl Scenegraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `root` as the active tree, returning the displaced one.
    ///
    /// May be called repeatedly at runtime; the host uses this to swap the
    /// main scene for the wireframe bounds overlay and back. Mesh, texture
    /// and light tables are unaffected by a swap.
    pub fn set_root(&mut self, root: SceneNode) -> Option<SceneNode> {
        self.root.replace(root)
    }

    #[must_use]
    pub fn root(&self) -> Option<&SceneNode> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn root_mut(&mut self) -> Option<&mut SceneNode> {
        self.root.as_mut()
    }

    /// Registers a mesh under `name`, replacing any previous entry.
    ///
    /// Meshes registered after [`SceneRenderer::register_meshes`] has run
    /// are not uploaded automatically; call it again.
    pub fn add_mesh(&mut self, name: impl Into<String>, mesh: PolygonMesh) {
        self.meshes.insert(name.into(), mesh);
    }

    #[must_use]
    pub fn mesh(&self, name: &str) -> Option<&PolygonMesh> {
        self.meshes.get(name)
    }

    /// All registered meshes, in no particular order.
    pub fn meshes(&self) -> impl Iterator<Item = (&str, &PolygonMesh)> {
        self.meshes.iter().map(|(n, m)| (n.as_str(), m))
    }

    /// Records a texture name → image path association.
    pub fn add_texture(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.textures.insert(name.into(), path.into());
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<&str> {
        self.textures.get(name).map(String::as_str)
    }

    /// Attaches an object-space light to the node named `node_name`.
    ///
    /// The node need not exist yet — bindings may be authored before the
    /// tree is assembled; [`validate`](Scenegraph::validate) checks them
    /// once construction is complete. Multiple lights may attach to one
    /// name; their order here is their order in the collected light list.
    pub fn add_light(&mut self, node_name: impl Into<String>, light: Light) {
        self.light_map
            .entry(node_name.into())
            .or_default()
            .push(LightAttachment::object(light));
    }

    #[must_use]
    pub fn light_map(&self) -> &LightMap {
        &self.light_map
    }

    /// Finds the first node named `name` in the active tree.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<&SceneNode> {
        self.root.as_ref().and_then(|r| r.find(name))
    }

    /// Mutable lookup, used by hosts to drive animation transforms.
    #[must_use]
    pub fn find_node_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.root.as_mut().and_then(|r| r.find_mut(name))
    }

    /// Checks the cross-cutting name bindings against the live tree.
    ///
    /// Call once scene construction is complete. Fails with
    /// [`CanopyError::DanglingLightBinding`] if a light-map key names no
    /// node reachable from the root. Duplicate node names and leaf mesh
    /// references that resolve to nothing are logged as warnings only:
    /// lookups are first-match-wins and a missing mesh stays a per-frame
    /// no-op rather than an error.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root.as_ref() else {
            return Ok(());
        };

        let mut names = FxHashSet::default();
        let mut mesh_names = Vec::new();
        collect_names(root, &mut names, &mut mesh_names);

        for key in self.light_map.keys() {
            if !names.contains(key.as_str()) {
                return Err(CanopyError::DanglingLightBinding(key.clone()));
            }
        }

        for mesh_name in mesh_names {
            if !self.meshes.contains_key(mesh_name) {
                log::warn!("leaf references unregistered mesh '{mesh_name}'; draws will be skipped");
            }
        }
        Ok(())
    }

    /// Draw-pass entry: delegates the active tree to the renderer. No-op
    /// while the root is unset, so a scene mid-construction never fails a
    /// frame.
    pub fn draw<B: RenderBackend>(
        &self,
        renderer: &mut SceneRenderer<B>,
        stack: &mut TransformStack,
    ) -> Result<()> {
        match self.root.as_ref() {
            Some(root) => renderer.draw(root, stack),
            None => Ok(()),
        }
    }

    /// Light-pass entry: delegates the active tree to the renderer,
    /// appending collected lights to `lights`. No-op while the root is
    /// unset.
    pub fn light_pass<B: RenderBackend>(
        &self,
        renderer: &SceneRenderer<B>,
        stack: &mut TransformStack,
        lights: &mut Vec<LightAttachment>,
    ) {
        if let Some(root) = self.root.as_ref() {
            renderer.light_pass(root, stack, &self.light_map, lights);
        }
    }
}

fn collect_names<'a>(
    node: &'a SceneNode,
    names: &mut FxHashSet<&'a str>,
    mesh_names: &mut Vec<&'a str>,
) {
    if !names.insert(node.name()) {
        log::warn!(
            "duplicate node name '{}'; lookups resolve to the first match in traversal order",
            node.name()
        );
    }
    match node {
        SceneNode::Group(g) => {
            for child in g.children() {
                collect_names(child, names, mesh_names);
            }
        }
        SceneNode::Transform(t) => {
            if let Some(child) = t.child() {
                collect_names(child, names, mesh_names);
            }
        }
        SceneNode::Leaf(l) => {
            if !l.mesh_name().is_empty() {
                mesh_names.push(l.mesh_name());
            }
        }
    }
}
