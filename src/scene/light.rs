//! Light sources and their authored coordinate frames.

use glam::{Mat4, Vec3, Vec4};

/// The frame in which a light's stored position and direction are expressed
/// before traversal-time conversion to eye space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Local to the node that owns the light; transformed by that node's
    /// accumulated modelview at the moment of traversal.
    Object,
    /// The scene's global frame; transformed by the camera transform once,
    /// at the root level, never per-node.
    World,
    /// Already eye-space; uploaded as-is.
    View,
}

/// A Phong-style light source.
///
/// `position.w == 0.0` encodes a directional light, any other `w` a
/// positional one. Nodes hold lights as templates: a traversal clones the
/// template before transforming it, so the stored values are never mutated
/// by a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Homogeneous position (w = 0 for directional lights).
    pub position: Vec4,
    /// Direction of the spot cone; w stays 0 so only rotation applies.
    pub spot_direction: Vec4,
    /// Half-angle of the spot cone in radians. The shader receives its
    /// cosine.
    pub spot_cutoff: f32,
    pub spot: bool,
}

impl Light {
    /// A black positional light at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ZERO,
            specular: Vec3::ZERO,
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            spot_direction: Vec4::new(0.0, 0.0, -1.0, 0.0),
            spot_cutoff: 0.0,
            spot: false,
        }
    }

    /// A positional light (w = 1).
    #[must_use]
    pub fn positional(ambient: Vec3, diffuse: Vec3, specular: Vec3, position: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            position: position.extend(1.0),
            ..Self::new()
        }
    }

    /// A directional light (w = 0); `direction` points from the light into
    /// the scene.
    #[must_use]
    pub fn directional(ambient: Vec3, diffuse: Vec3, specular: Vec3, direction: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            position: direction.extend(0.0),
            ..Self::new()
        }
    }

    /// Turns this light into a spot with the given cone direction and
    /// half-angle (radians).
    #[must_use]
    pub fn with_spot(mut self, direction: Vec3, cutoff: f32) -> Self {
        self.spot_direction = direction.extend(0.0);
        self.spot_cutoff = cutoff;
        self.spot = true;
        self
    }

    /// Returns a copy with position and spot direction carried through
    /// `matrix`. The receiver is left untouched.
    #[must_use]
    pub fn transformed(&self, matrix: Mat4) -> Self {
        let mut out = self.clone();
        out.position = matrix * self.position;
        out.spot_direction = matrix * self.spot_direction;
        out
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

/// A light paired with the coordinate system its values are authored in.
#[derive(Debug, Clone, PartialEq)]
pub struct LightAttachment {
    pub light: Light,
    pub coordinate_system: CoordinateSystem,
}

impl LightAttachment {
    /// An attachment authored in the owning node's local frame.
    #[must_use]
    pub fn object(light: Light) -> Self {
        Self {
            light,
            coordinate_system: CoordinateSystem::Object,
        }
    }

    /// An attachment authored in the scene's global frame.
    #[must_use]
    pub fn world(light: Light) -> Self {
        Self {
            light,
            coordinate_system: CoordinateSystem::World,
        }
    }

    /// An attachment already in eye space.
    #[must_use]
    pub fn view(light: Light) -> Self {
        Self {
            light,
            coordinate_system: CoordinateSystem::View,
        }
    }
}
