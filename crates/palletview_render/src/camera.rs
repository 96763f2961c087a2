//! Perspective camera
//!
//! The camera is a position plus the point it looks at, with +Y up. Field of
//! view and clip planes are fixed at construction; only the aspect ratio
//! follows the drawable size.

use palletview_input::OrbitCamera;
use palletview_math::{mat4, Mat4, Vec3};

/// Perspective camera looking at a target
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    position: Vec3,
    target: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 1.0, 0.1, 1000.0)
    }
}

impl PerspectiveCamera {
    /// Create a camera at `(0, 0, 5)` looking at the origin
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Aspect ratio for a pixel size; a zero height gives 1.0
    pub fn aspect_for_size(width: u32, height: u32) -> f32 {
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Update the aspect ratio from a pixel size
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_for_size(width, height);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point the camera is aimed at
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalized()
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        mat4::look_at(self.position, self.target, Vec3::Y)
    }

    /// Projection matrix with `[0, 1]` depth
    pub fn projection_matrix(&self) -> Mat4 {
        mat4::perspective(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        mat4::mul(self.projection_matrix(), self.view_matrix())
    }
}

impl OrbitCamera for PerspectiveCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    fn fov_y(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalized()
    }

    fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
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
    fn test_aspect_for_size() {
        assert_eq!(PerspectiveCamera::aspect_for_size(1600, 800), 2.0);
        assert_eq!(PerspectiveCamera::aspect_for_size(800, 0), 1.0);
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = PerspectiveCamera::default();
        assert!(vec_approx_eq(camera.forward(), Vec3::new(0.0, 0.0, -1.0)));
        assert!(vec_approx_eq(camera.right(), Vec3::X));
        assert!(vec_approx_eq(camera.up(), Vec3::Y));
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = PerspectiveCamera::new(75.0, 1.5, 0.1, 1000.0);
        camera.set_position(Vec3::new(7.0, 5.0, 7.0));
        camera.look_at(Vec3::new(1.0, 1.0, 1.0));

        let vp = camera.view_projection();
        let t = Vec3::new(1.0, 1.0, 1.0);
        let clip_x = vp[0][0] * t.x + vp[1][0] * t.y + vp[2][0] * t.z + vp[3][0];
        let clip_y = vp[0][1] * t.x + vp[1][1] * t.y + vp[2][1] * t.z + vp[3][1];
        assert!(clip_x.abs() < EPSILON);
        assert!(clip_y.abs() < EPSILON);
    }
}
