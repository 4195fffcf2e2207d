//! Procedural primitive meshes.

use glam::Vec3;

use crate::resources::mesh::{PolygonMesh, VertexAttribute};

/// An axis-aligned box centered at the origin, 4 vertices per face with
/// per-face normals, 12 triangles.
#[must_use]
pub fn box_mesh(width: f32, height: f32, depth: f32) -> PolygonMesh {
    let w = width / 2.0;
    let h = height / 2.0;
    let d = depth / 2.0;

    // 24 vertices, 4 per face
    let positions = [
        // Front face (+Z)
        Vec3::new(-w, -h, d),
        Vec3::new(w, -h, d),
        Vec3::new(w, h, d),
        Vec3::new(-w, h, d),
        // Back face (-Z)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, -h, -d),
        // Top face (+Y)
        Vec3::new(-w, h, -d),
        Vec3::new(-w, h, d),
        Vec3::new(w, h, d),
        Vec3::new(w, h, -d),
        // Bottom face (-Y)
        Vec3::new(-w, -h, -d),
        Vec3::new(w, -h, -d),
        Vec3::new(w, -h, d),
        Vec3::new(-w, -h, d),
        // Right face (+X)
        Vec3::new(w, -h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, h, d),
        Vec3::new(w, -h, d),
        // Left face (-X)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, -h, d),
        Vec3::new(-w, h, d),
        Vec3::new(-w, h, -d),
    ];

    let face_normals = [
        Vec3::Z,
        Vec3::NEG_Z,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::X,
        Vec3::NEG_X,
    ];
    let normals: Vec<Vec3> = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat_n(*n, 4))
        .collect();

    let mut indices = Vec::with_capacity(36);
    for face in 0..6u32 {
        let base = face * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    PolygonMesh::new()
        .with_attribute("position", VertexAttribute::vec3(&positions))
        .with_attribute("normal", VertexAttribute::vec3(&normals))
        .with_indices(&indices)
}

/// A unit box, the default stand-in geometry.
#[must_use]
pub fn unit_box() -> PolygonMesh {
    box_mesh(1.0, 1.0, 1.0)
}
