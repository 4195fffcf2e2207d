//! GPU uniform block layouts for the wgpu backend.
//!
//! Plain-old-data structs laid out in 16-byte chunks so they can be written
//! to uniform buffers byte-for-byte. Named uniform writes from the
//! [`RenderBackend`](crate::renderer::RenderBackend) contract are routed
//! into fields of these blocks.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Upper bound of the shader's positional light array.
pub const MAX_LIGHTS: usize = 16;

/// One entry of the shader's `light[i]` array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    // 16 bytes chunk 0
    pub position: Vec4,
    // 16 bytes chunk 1
    pub spot_direction: Vec4,
    // 16 bytes chunk 2
    pub ambient: Vec3,
    pub cos_cutoff: f32,
    // 16 bytes chunk 3
    pub diffuse: Vec3,
    pub is_spot: u32,
    // 16 bytes chunk 4
    pub specular: Vec3,
    pub(crate) _padding0: f32,
}

impl Default for GpuLight {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Frame-global uniforms: projection and the collected light array,
/// uploaded once per frame between the light pass and the draw pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub projection: Mat4,
    pub lights: [GpuLight; MAX_LIGHTS],
    pub light_count: u32,
    pub(crate) _padding0: [u32; 3],
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            lights: [GpuLight::default(); MAX_LIGHTS],
            light_count: 0,
            _padding0: [0; 3],
        }
    }
}

/// Per-draw uniforms: transforms plus material, one dynamic-offset slot
/// per recorded draw command.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub modelview: Mat4,
    pub normal_matrix: Mat4,
    // 16 bytes chunk
    pub ambient: Vec3,
    pub shininess: f32,
    // 16 bytes chunk
    pub diffuse: Vec3,
    pub(crate) _padding0: f32,
    // 16 bytes chunk
    pub specular: Vec3,
    pub(crate) _padding1: f32,
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        Self {
            modelview: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
            ambient: Vec3::ZERO,
            shininess: 1.0,
            diffuse: Vec3::ZERO,
            _padding0: 0.0,
            specular: Vec3::ZERO,
            _padding1: 0.0,
        }
    }
}
