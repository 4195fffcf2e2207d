//! The shader/GPU boundary.
//!
//! [`RenderBackend`] is the contract between the scene-graph renderer and
//! a shader program: named uniform writes, mesh upload keyed by attribute
//! bindings, and an indexed draw per uploaded mesh. The crate ships a wgpu
//! implementation ([`WgpuBackend`]); tests drive the renderer through a
//! recording mock instead.
//!
//! [`WgpuBackend`]: crate::renderer::wgpu::WgpuBackend

use glam::{Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::renderer::AttributeBindings;
use crate::resources::PolygonMesh;

/// A GPU shader program handle.
///
/// Uniform writes address uniforms by name (`"modelview"`,
/// `"material.ambient"`, `"light[2].position"`, …). Writes to names the
/// program does not expose are silent no-ops, mirroring GL uniform-location
/// semantics; a backend may log them at trace level.
pub trait RenderBackend {
    /// GPU-resident mesh handle produced by [`upload_mesh`] and consumed by
    /// [`draw_mesh`] / [`release_mesh`].
    ///
    /// [`upload_mesh`]: RenderBackend::upload_mesh
    /// [`draw_mesh`]: RenderBackend::draw_mesh
    /// [`release_mesh`]: RenderBackend::release_mesh
    type MeshHandle;

    /// Builds GPU buffers for `mesh`, consuming the attributes named by
    /// `bindings` in binding order. The caller has already checked that
    /// every bound attribute is present.
    fn upload_mesh(
        &mut self,
        name: &str,
        mesh: &PolygonMesh,
        bindings: &AttributeBindings,
    ) -> Result<Self::MeshHandle>;

    /// Releases the GPU resources behind `handle`.
    fn release_mesh(&mut self, handle: Self::MeshHandle);

    fn set_mat4(&mut self, name: &str, value: Mat4);
    fn set_vec4(&mut self, name: &str, value: Vec4);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_f32(&mut self, name: &str, value: f32);
    fn set_i32(&mut self, name: &str, value: i32);

    /// Issues the indexed draw for `handle` under the uniform state set so
    /// far this frame.
    fn draw_mesh(&mut self, handle: &Self::MeshHandle) -> Result<()>;
}
