//! Shadow camera fitting
//!
//! A directional light's shadow map covers an orthographic box aligned with
//! the light and fitted around the scene bounds.

use palletview_core::DirectionalLight;
use palletview_math::{mat4, Aabb, Mat4, Vec3};

/// View-projection matrix of the light's shadow camera
///
/// The box is a cube of the bounds' diagonal centered on the bounds, so every
/// caster fits regardless of the light angle.
pub fn light_view_projection(light: &DirectionalLight, bounds: &Aabb) -> Mat4 {
    let bounds = if bounds.is_empty() {
        Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)
    } else {
        *bounds
    };
    let center = bounds.center();
    let radius = (bounds.size().length() * 0.5).max(0.5);

    let direction = light.direction();
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let eye = center - direction * (radius * 2.0);

    let view = mat4::look_at(eye, center, up);
    let projection = mat4::orthographic(-radius, radius, -radius, radius, radius, radius * 3.0);
    mat4::mul(projection, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use palletview_core::Color;

    fn key_light() -> DirectionalLight {
        DirectionalLight {
            color: Color::WHITE,
            intensity: 0.8,
            position: Vec3::new(10.0, 10.0, 5.0),
            target: Vec3::ZERO,
            shadow: None,
        }
    }

    fn to_clip(m: &Mat4, p: Vec3) -> Vec3 {
        mat4::transform_point(m, p)
    }

    #[test]
    fn test_bounds_corners_land_inside_clip_volume() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::new(12.0, 8.0, 10.0));
        let m = light_view_projection(&key_light(), &bounds);
        for corner in bounds.corners() {
            let c = to_clip(&m, corner);
            assert!(c.x.abs() <= 1.0 + 1e-4, "{:?}", c);
            assert!(c.y.abs() <= 1.0 + 1e-4, "{:?}", c);
            assert!(c.z >= -1e-4 && c.z <= 1.0 + 1e-4, "{:?}", c);
        }
    }

    #[test]
    fn test_vertical_light_uses_fallback_up() {
        let mut light = key_light();
        light.position = Vec3::new(0.0, 10.0, 0.0);
        let m = light_view_projection(&light, &Aabb::new(Vec3::ZERO, Vec3::ONE));
        assert!(m.iter().flatten().all(|v| v.is_finite()));
    }
}
