//! Runtime materials
//!
//! A [`Material`] is the constructed form of a [`MaterialSpec`]. Every scene
//! node owns its own copy so per-node flags such as wireframe can be flipped
//! independently.

use crate::color::Color;
use crate::document::{MaterialKind, MaterialSpec, Side};

/// Lighting model used to shade a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Diffuse + specular highlight
    Phong,
    /// Diffuse only
    Lambert,
    /// Physically based (shaded as diffuse + soft specular)
    Standard,
    /// Unlit flat color
    Basic,
    /// Unlit line color
    Line,
}

impl Shading {
    /// True if lights affect the surface
    pub fn is_lit(self) -> bool {
        !matches!(self, Shading::Basic | Shading::Line)
    }

    /// Index understood by the scene shader
    pub fn shader_index(self) -> u32 {
        match self {
            Shading::Phong => 0,
            Shading::Lambert => 1,
            Shading::Standard => 2,
            Shading::Basic => 3,
            Shading::Line => 4,
        }
    }
}

/// Constructed material
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub linewidth: f32,
    pub wireframe: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self::fallback()
    }
}

impl Material {
    /// Opaque gray Phong material used for unknown material types
    pub fn fallback() -> Self {
        Self::new(Shading::Phong, Color::from_hex(0x808080))
    }

    pub fn new(shading: Shading, color: Color) -> Self {
        Self {
            shading,
            color,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            linewidth: 1.0,
            wireframe: false,
        }
    }

    /// Build from a document entry; unknown kinds yield [`Material::fallback`]
    pub fn from_spec(spec: &MaterialSpec) -> Self {
        let shading = match &spec.kind {
            MaterialKind::MeshPhong => Shading::Phong,
            MaterialKind::MeshLambert => Shading::Lambert,
            MaterialKind::MeshStandard => Shading::Standard,
            MaterialKind::MeshBasic => Shading::Basic,
            MaterialKind::LineBasic => Shading::Line,
            MaterialKind::Other(tag) => {
                log::warn!(
                    "Material '{}' has unknown type '{}', using default gray",
                    spec.uuid,
                    tag
                );
                return Self::fallback();
            }
        };

        Self {
            shading,
            color: spec.color,
            opacity: spec.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            transparent: spec.transparent.unwrap_or(false),
            side: spec.side.unwrap_or_default(),
            linewidth: spec.linewidth.unwrap_or(1.0),
            wireframe: false,
        }
    }

    /// Alpha actually used when drawing; opacity only applies to transparent materials
    pub fn effective_alpha(&self) -> f32 {
        if self.transparent {
            self.opacity
        } else {
            1.0
        }
    }

    /// True if the material needs blending and back-to-front ordering
    pub fn is_blended(&self) -> bool {
        self.transparent && self.opacity < 1.0
    }
}
