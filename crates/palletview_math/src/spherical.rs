//! Spherical coordinates (y-up)
//!
//! `theta` is the azimuth around +Y measured from +Z towards +X, `phi` is the
//! polar angle measured from +Y.

use crate::Vec3;

/// Smallest polar angle distance kept from the poles
pub const POLE_EPSILON: f32 = 1e-6;

/// A point in spherical coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Convert a cartesian offset into spherical coordinates
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    /// Convert back to a cartesian offset
    pub fn to_vec3(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` away from the poles so a look-at basis stays defined
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_axis_conversions() {
        let s = Spherical::from_vec3(Vec3::new(0.0, 0.0, 2.0));
        assert!((s.radius - 2.0).abs() < EPSILON);
        assert!((s.phi - std::f32::consts::FRAC_PI_2).abs() < EPSILON);
        assert!(s.theta.abs() < EPSILON);

        let up = Spherical::from_vec3(Vec3::Y);
        assert!(up.phi.abs() < EPSILON);
    }

    #[test]
    fn test_round_trip_offset() {
        let v = Vec3::new(0.7, 0.5, 0.7) * 9.0;
        let back = Spherical::from_vec3(v).to_vec3();
        assert!(vec_approx_eq(v, back), "got {:?}", back);
    }

    #[test]
    fn test_zero_vector() {
        let s = Spherical::from_vec3(Vec3::ZERO);
        assert_eq!(s, Spherical::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_make_safe_clamps_poles() {
        let mut s = Spherical::new(1.0, 0.0, 0.0);
        s.make_safe();
        assert!(s.phi > 0.0);

        let mut s = Spherical::new(1.0, 4.0, 0.0);
        s.make_safe();
        assert!(s.phi < std::f32::consts::PI);
    }
}
