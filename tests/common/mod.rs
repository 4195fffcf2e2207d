//! Shared test fixtures: a recording render backend and small meshes.
#![allow(dead_code)]

use canopy::errors::{CanopyError, Result};
use canopy::renderer::{AttributeBindings, RenderBackend};
use canopy::resources::{PolygonMesh, VertexAttribute};
use glam::{Mat4, Vec3, Vec4};

/// Everything a backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UploadMesh(String),
    SetMat4(String, Mat4),
    SetVec4(String, Vec4),
    SetVec3(String, Vec3),
    SetF32(String, f32),
    SetI32(String, i32),
    Draw(String),
    Release(String),
}

/// A [`RenderBackend`] that records every call instead of touching a GPU.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    /// When set, every draw call fails; used to check traversal cleanup.
    pub fail_draws: bool,
}

impl RecordingBackend {
    /// Mesh names drawn, in order.
    pub fn draws(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The last value written to the mat4 uniform `name`.
    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetMat4(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    /// The last value written to the vec4 uniform `name`.
    pub fn vec4(&self, name: &str) -> Option<Vec4> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetVec4(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    /// Index of the first call matching `pred`.
    pub fn position_of(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl RenderBackend for RecordingBackend {
    type MeshHandle = String;

    fn upload_mesh(
        &mut self,
        name: &str,
        _mesh: &PolygonMesh,
        _bindings: &AttributeBindings,
    ) -> Result<String> {
        self.calls.push(Call::UploadMesh(name.to_string()));
        Ok(name.to_string())
    }

    fn release_mesh(&mut self, handle: String) {
        self.calls.push(Call::Release(handle));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.calls.push(Call::SetMat4(name.to_string(), value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.calls.push(Call::SetVec4(name.to_string(), value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.calls.push(Call::SetVec3(name.to_string(), value));
    }

    fn set_f32(&mut self, name: &str, value: f32) {
        self.calls.push(Call::SetF32(name.to_string(), value));
    }

    fn set_i32(&mut self, name: &str, value: i32) {
        self.calls.push(Call::SetI32(name.to_string(), value));
    }

    fn draw_mesh(&mut self, handle: &String) -> Result<()> {
        if self.fail_draws {
            return Err(CanopyError::Backend("draw rejected".to_string()));
        }
        self.calls.push(Call::Draw(handle.clone()));
        Ok(())
    }
}

/// The position+normal binding set the demo shaders use.
pub fn phong_bindings() -> AttributeBindings {
    AttributeBindings::new()
        .bind("vPosition", "position")
        .bind("vNormal", "normal")
}

/// A mesh carrying positions only; fails phong binding validation.
pub fn position_only_mesh() -> PolygonMesh {
    PolygonMesh::new()
        .with_attribute(
            "position",
            VertexAttribute::vec3(&[Vec3::ZERO, Vec3::X, Vec3::Y]),
        )
        .with_indices(&[0, 1, 2])
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
