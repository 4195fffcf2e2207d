//! Polygon mesh data.
//!
//! A [`PolygonMesh`] is the CPU-side mesh resource the renderer uploads:
//! named per-vertex attribute arrays, a `u32` index list, and a primitive
//! topology. The scene core only relies on vertex count, attribute
//! presence-by-name, and the derivable [`wireframe`](PolygonMesh::wireframe)
//! variant; how the data got here (OBJ import, procedural generation) is an
//! external concern.

use glam::{Vec2, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

/// Primitive topology of a mesh's index list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    #[default]
    Triangles,
    Lines,
}

/// One named per-vertex attribute: `components` floats per vertex, stored
/// flat.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    components: usize,
    data: Vec<f32>,
}

impl VertexAttribute {
    #[must_use]
    pub fn new(components: usize, data: Vec<f32>) -> Self {
        Self { components, data }
    }

    #[must_use]
    pub fn vec3(values: &[Vec3]) -> Self {
        Self {
            components: 3,
            data: values.iter().flat_map(|v| v.to_array()).collect(),
        }
    }

    #[must_use]
    pub fn vec2(values: &[Vec2]) -> Self {
        Self {
            components: 2,
            data: values.iter().flat_map(|v| v.to_array()).collect(),
        }
    }

    /// Floats per vertex.
    #[must_use]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of vertices this attribute covers.
    #[must_use]
    pub fn count(&self) -> usize {
        if self.components == 0 {
            return 0;
        }
        self.data.len() / self.components
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// An indexed mesh with named vertex attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonMesh {
    attributes: FxHashMap<String, VertexAttribute>,
    indices: Vec<u32>,
    topology: Topology,
}

impl PolygonMesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a named attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, attribute: VertexAttribute) {
        self.attributes.insert(name.into(), attribute);
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: VertexAttribute) -> Self {
        self.set_attribute(name, attribute);
        self
    }

    pub fn set_indices(&mut self, indices: &[u32]) {
        self.indices = indices.to_vec();
    }

    #[must_use]
    pub fn with_indices(mut self, indices: &[u32]) -> Self {
        self.set_indices(indices);
        self
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &VertexAttribute)> {
        self.attributes.iter().map(|(n, a)| (n.as_str(), a))
    }

    /// Vertex count: the smallest count over all attributes, zero when the
    /// mesh has none.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.attributes
            .values()
            .map(VertexAttribute::count)
            .min()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Derives the wireframe variant: the same vertex data with the
    /// triangle index list replaced by the set of unique edges as a line
    /// list. Calling this on a line mesh returns a plain copy.
    #[must_use]
    pub fn wireframe(&self) -> PolygonMesh {
        if self.topology == Topology::Lines {
            return self.clone();
        }

        let mut seen = FxHashSet::default();
        let mut lines = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let edge = (a.min(b), a.max(b));
                if seen.insert(edge) {
                    lines.extend_from_slice(&[a, b]);
                }
            }
        }

        PolygonMesh {
            attributes: self.attributes.clone(),
            indices: lines,
            topology: Topology::Lines,
        }
    }
}
