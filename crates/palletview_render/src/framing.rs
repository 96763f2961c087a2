//! Camera auto-framing
//!
//! Places the camera so the whole scene is in view: at the bounds center plus
//! a fixed direction scaled by the largest extent.

use palletview_input::OrbitCamera;
use palletview_math::{Aabb, Vec3};

/// Where the framing heuristic puts the camera
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramingConfig {
    /// Multiple of the largest extent used as the offset scale
    pub distance_factor: f32,
    /// Offset direction from the center (used as given, not normalized)
    pub direction: Vec3,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            distance_factor: 1.5,
            direction: Vec3::new(0.7, 0.5, 0.7),
        }
    }
}

/// Result of framing a bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    pub center: Vec3,
    pub max_extent: f32,
    pub position: Vec3,
}

impl FramingConfig {
    /// Extents at or below this are framed as a unit box
    pub const MIN_EXTENT: f32 = 1e-4;

    /// Compute the camera placement for `bounds`
    ///
    /// Empty bounds are framed as a unit box at the origin; zero-size bounds
    /// as a unit box around their center.
    pub fn frame(&self, bounds: &Aabb) -> Framing {
        let bounds = if bounds.is_empty() {
            Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)
        } else {
            *bounds
        };
        let center = bounds.center();
        let max_extent = match bounds.max_extent() {
            extent if extent > Self::MIN_EXTENT => extent,
            _ => 1.0,
        };
        Framing {
            center,
            max_extent,
            position: center + self.direction * (self.distance_factor * max_extent),
        }
    }

    /// Move a camera to frame `bounds` and aim it at the center
    pub fn apply<C: OrbitCamera>(&self, camera: &mut C, bounds: &Aabb) -> Framing {
        let framing = self.frame(bounds);
        camera.set_position(framing.position);
        camera.look_at(framing.center);
        framing
    }
}
