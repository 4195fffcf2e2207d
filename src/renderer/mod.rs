//! Scene-graph renderer.
//!
//! [`SceneRenderer`] is the single point of contact between the scene tree
//! and the GPU. It owns the per-mesh GPU handles and the shader attribute
//! bindings, receives the draw/light-pass delegation from the tree, and
//! pushes per-draw uniform state (modelview, normal matrix, material) plus
//! the per-frame light array through a [`RenderBackend`].
//!
//! Per frame the host runs two walks in a fixed order: the light pass
//! first, whose output must be uploaded before any geometry reaches the
//! shader (the shader reads the light array positionally while rasterizing
//! each mesh), then the draw pass on a freshly reset stack.
//! [`SceneRenderer::render_frame`] drives that sequence.

pub mod backend;
pub mod uniforms;
pub mod wgpu;

pub use backend::RenderBackend;

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::errors::{CanopyError, Result};
use crate::resources::{Material, PolygonMesh};
use crate::scene::graph::{LightMap, Scenegraph};
use crate::scene::light::{CoordinateSystem, LightAttachment};
use crate::scene::node::SceneNode;
use crate::scene::stack::TransformStack;

/// The uniform name contract shared by every backend.
pub mod uniform {
    pub const MODELVIEW: &str = "modelview";
    pub const PROJECTION: &str = "projection";
    pub const NORMAL_MATRIX: &str = "normalmatrix";
    pub const MATERIAL_AMBIENT: &str = "material.ambient";
    pub const MATERIAL_DIFFUSE: &str = "material.diffuse";
    pub const MATERIAL_SPECULAR: &str = "material.specular";
    pub const MATERIAL_SHININESS: &str = "material.shininess";
    pub const LIGHT_COUNT: &str = "numLights";

    /// Name of one field of the positional light array, e.g.
    /// `light[2].spotDirection`.
    #[must_use]
    pub fn light(index: usize, field: &str) -> String {
        format!("light[{index}].{field}")
    }
}

/// Ordered shader-attribute → mesh-attribute name mapping.
///
/// The order of `bind` calls is the vertex buffer binding order (shader
/// location 0, 1, …). Every bound mesh attribute is required: registering a
/// mesh that lacks one fails at registration time, before any draw call
/// can reference the mesh.
#[derive(Debug, Clone, Default)]
pub struct AttributeBindings {
    bindings: Vec<(String, String)>,
}

impl AttributeBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the shader attribute `shader_var` to the mesh attribute named
    /// `attribute`.
    #[must_use]
    pub fn bind(mut self, shader_var: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.bindings.push((shader_var.into(), attribute.into()));
        self
    }

    /// `(shader_var, mesh_attribute)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(s, a)| (s.as_str(), a.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Renders a [`Scenegraph`] through a [`RenderBackend`].
pub struct SceneRenderer<B: RenderBackend> {
    backend: B,
    bindings: AttributeBindings,
    meshes: FxHashMap<String, B::MeshHandle>,
}

impl<B: RenderBackend> SceneRenderer<B> {
    #[must_use]
    pub fn new(backend: B, bindings: AttributeBindings) -> Self {
        Self {
            backend,
            bindings,
            meshes: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn has_mesh(&self, name: &str) -> bool {
        self.meshes.contains_key(name)
    }

    /// Registers one mesh for drawing.
    ///
    /// No-op if `name` is already registered or the mesh has no vertices.
    /// Fails fast with [`CanopyError::MissingAttribute`] when the mesh
    /// lacks an attribute the bindings require — at registration time, not
    /// at draw time.
    pub fn add_mesh(&mut self, name: &str, mesh: &PolygonMesh) -> Result<()> {
        if self.meshes.contains_key(name) {
            return Ok(());
        }
        if mesh.vertex_count() == 0 {
            return Ok(());
        }
        for (_, attribute) in self.bindings.iter() {
            if !mesh.has_attribute(attribute) {
                return Err(CanopyError::MissingAttribute {
                    mesh: name.to_string(),
                    attribute: attribute.to_string(),
                });
            }
        }
        let handle = self.backend.upload_mesh(name, mesh, &self.bindings)?;
        self.meshes.insert(name.to_string(), handle);
        log::debug!("registered mesh '{name}' ({} vertices)", mesh.vertex_count());
        Ok(())
    }

    /// Uploads every mesh currently registered on `graph`.
    ///
    /// Call once scene construction is complete. Meshes added to the graph
    /// afterwards are not auto-uploaded; call again to pick them up
    /// (already-registered names are skipped).
    pub fn register_meshes(&mut self, graph: &Scenegraph) -> Result<()> {
        for (name, mesh) in graph.meshes() {
            self.add_mesh(name, mesh)?;
        }
        Ok(())
    }

    /// Draw-pass entry point: delegates into the tree, which calls back
    /// through [`draw_mesh`](SceneRenderer::draw_mesh) at each leaf.
    pub fn draw(&mut self, root: &SceneNode, stack: &mut TransformStack) -> Result<()> {
        root.draw(self, stack)
    }

    /// Light-pass entry point. All traversal logic lives in the tree; this
    /// mirrors [`draw`](SceneRenderer::draw) so both walks share one
    /// controlled entry.
    pub fn light_pass(
        &self,
        root: &SceneNode,
        stack: &mut TransformStack,
        light_map: &LightMap,
        lights: &mut Vec<LightAttachment>,
    ) {
        root.light_pass(stack, light_map, lights);
    }

    /// Draws one registered mesh under `transform`.
    ///
    /// Silent no-op when `name` was never registered — partially built
    /// scenes must not crash a frame. Uploads the modelview, the material,
    /// and the normal-correction matrix (inverse-transpose of the
    /// transform), then issues the draw call.
    pub fn draw_mesh(
        &mut self,
        name: &str,
        material: &Material,
        texture: Option<&str>,
        transform: Mat4,
    ) -> Result<()> {
        let Some(handle) = self.meshes.get(name) else {
            log::trace!("skipping draw of unregistered mesh '{name}'");
            return Ok(());
        };
        if let Some(texture) = texture {
            log::trace!("drawing mesh '{name}' with texture '{texture}'");
        }

        self.backend.set_mat4(uniform::MODELVIEW, transform);
        self.backend
            .set_vec3(uniform::MATERIAL_AMBIENT, material.ambient);
        self.backend
            .set_vec3(uniform::MATERIAL_DIFFUSE, material.diffuse);
        self.backend
            .set_vec3(uniform::MATERIAL_SPECULAR, material.specular);
        self.backend
            .set_f32(uniform::MATERIAL_SHININESS, material.shininess);
        self.backend
            .set_mat4(uniform::NORMAL_MATRIX, normal_matrix(transform));

        self.backend.draw_mesh(handle)
    }

    /// Uploads the collected light list to the shader's positional light
    /// array. Must run after the light pass completes and before the draw
    /// pass starts.
    pub fn upload_lights(&mut self, lights: &[LightAttachment]) {
        self.backend
            .set_i32(uniform::LIGHT_COUNT, lights.len() as i32);
        for (i, attachment) in lights.iter().enumerate() {
            let light = &attachment.light;
            self.backend
                .set_vec4(&uniform::light(i, "position"), light.position);
            self.backend
                .set_vec4(&uniform::light(i, "spotDirection"), light.spot_direction);
            self.backend
                .set_vec3(&uniform::light(i, "ambient"), light.ambient);
            self.backend
                .set_vec3(&uniform::light(i, "diffuse"), light.diffuse);
            self.backend
                .set_vec3(&uniform::light(i, "specular"), light.specular);
            self.backend
                .set_f32(&uniform::light(i, "cos_Cutoff"), light.spot_cutoff.cos());
            self.backend
                .set_i32(&uniform::light(i, "isSpot"), i32::from(light.spot));
        }
    }

    /// Runs one complete frame: light pass, light upload, draw pass.
    ///
    /// `view` is the camera transform seeding both walks; `host_lights`
    /// are the scene-level lights authored in World or View coordinates
    /// (World ones are converted by `view` once, here at the root level).
    /// Light array order is host lights in declared order, then tree
    /// lights in pre-order — deterministic across frames, which matters
    /// because shaders index lights positionally.
    pub fn render_frame(
        &mut self,
        graph: &Scenegraph,
        view: Mat4,
        projection: Mat4,
        host_lights: &[LightAttachment],
    ) -> Result<()> {
        let mut lights = Vec::new();
        for attachment in host_lights {
            match attachment.coordinate_system {
                CoordinateSystem::View => lights.push(attachment.clone()),
                CoordinateSystem::World => lights.push(LightAttachment {
                    light: attachment.light.transformed(view),
                    coordinate_system: CoordinateSystem::World,
                }),
                CoordinateSystem::Object => {
                    log::warn!(
                        "object-space light passed as a host light; attach it to a node instead"
                    );
                }
            }
        }

        let mut stack = TransformStack::new();
        {
            let mut frame = stack.pushed(view);
            graph.light_pass(self, &mut frame, &mut lights);
        }

        self.upload_lights(&lights);
        self.backend.set_mat4(uniform::PROJECTION, projection);

        stack.reset();
        let mut frame = stack.pushed(view);
        graph.draw(self, &mut frame)
    }

    /// Releases every registered mesh's GPU resources and returns the
    /// backend. Consuming `self` makes double-dispose unrepresentable.
    pub fn dispose(mut self) -> B {
        for (name, handle) in self.meshes.drain() {
            log::debug!("releasing mesh '{name}'");
            self.backend.release_mesh(handle);
        }
        self.backend
    }
}

/// Normal-correction matrix: inverse-transpose of the modelview.
///
/// A singular transform (e.g. a zero scale on some axis) has no inverse;
/// rather than upload NaNs, fall back to the identity and warn.
fn normal_matrix(transform: Mat4) -> Mat4 {
    if transform.determinant().abs() <= f32::EPSILON {
        log::warn!("singular modelview, normal matrix falls back to identity");
        return Mat4::IDENTITY;
    }
    transform.inverse().transpose()
}
