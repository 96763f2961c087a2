//! Orbit controls for inspecting a scene
//!
//! Controls:
//! - Left drag: orbit around the target
//! - Right / middle drag: pan the target in the camera plane
//! - Wheel: zoom towards / away from the target
//!
//! Input only accumulates pending motion; [`OrbitControls::update`] applies it
//! to the camera. With damping enabled each update applies a fraction of the
//! pending motion and the rest decays, so the camera glides to a stop.

use std::f32::consts::PI;

use palletview_math::{Spherical, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Movement below this is not reported as a change
const CHANGE_EPSILON: f32 = 1e-6;

/// Pixels of trackpad scroll treated as one wheel notch
const PIXELS_PER_NOTCH: f64 = 50.0;

/// Damped orbit controls around a target point
pub struct OrbitControls {
    target: Vec3,

    // Pending motion
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    pending_pan: (f32, f32),

    // Button state
    rotating: bool,
    panning: bool,

    enabled: bool,
    viewport_height: f32,

    // Configuration
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,

            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            pending_pan: (0.0, 0.0),

            rotating: false,
            panning: false,

            enabled: true,
            viewport_height: 1.0,

            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }

    /// Point the camera orbits around
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Move the target and drop any pending or gliding motion
    pub fn reset_to(&mut self, target: Vec3) {
        self.target = target;
        self.clear_motion();
    }

    /// Height in pixels of the view the input is measured in
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True while a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.rotating || self.panning
    }

    /// Detach from input; later input and updates are ignored
    pub fn dispose(&mut self) {
        if self.enabled {
            log::debug!("Orbit controls disposed");
        }
        self.enabled = false;
        self.rotating = false;
        self.panning = false;
        self.clear_motion();
    }

    /// Process mouse button input
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if !self.enabled {
            return;
        }
        let pressed = state == ElementState::Pressed;

        match button {
            MouseButton::Left => {
                self.rotating = pressed;
            }
            MouseButton::Right | MouseButton::Middle => {
                self.panning = pressed;
            }
            _ => {}
        }
    }

    /// Process mouse movement (in pixels)
    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        if !self.enabled {
            return;
        }
        let (dx, dy) = (delta_x as f32, delta_y as f32);

        if self.rotating {
            let per_pixel = 2.0 * PI / self.viewport_height * self.rotate_speed;
            self.rotate_left(dx * per_pixel);
            self.rotate_up(dy * per_pixel);
        } else if self.panning {
            self.pending_pan.0 += dx * self.pan_speed;
            self.pending_pan.1 += dy * self.pan_speed;
        }
    }

    /// Process wheel input; scrolling up zooms in
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        if !self.enabled {
            return;
        }
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y as f64,
            MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_NOTCH,
        };
        if notches == 0.0 {
            return;
        }
        self.scale *= self.zoom_scale().powf(notches as f32);
    }

    /// Apply pending motion to the camera
    ///
    /// Returns true if the camera moved.
    pub fn update<C: OrbitCamera>(&mut self, camera: &mut C) -> bool {
        if !self.enabled {
            return false;
        }

        let old_position = camera.position();
        let old_target = self.target;

        self.resolve_pan(camera);

        let offset = old_position - self.target;
        let mut spherical = Spherical::from_vec3(offset);

        let step = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * step;

        let position = self.target + spherical.to_vec3();
        camera.set_position(position);
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (position - old_position).length_squared() > CHANGE_EPSILON
            || (self.target - old_target).length_squared() > CHANGE_EPSILON
    }

    /// Builder: enable or disable damping
    pub fn with_damping(mut self, enabled: bool, factor: f32) -> Self {
        self.enable_damping = enabled;
        self.damping_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Builder: set rotation speed
    pub fn with_rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }

    /// Builder: set zoom speed
    pub fn with_zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }

    /// Builder: set pan speed
    pub fn with_pan_speed(mut self, speed: f32) -> Self {
        self.pan_speed = speed;
        self
    }

    /// Builder: clamp the orbit radius
    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min.max(0.0);
        self.max_distance = max.max(self.min_distance);
        self
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Convert pending pan pixels into a world-space offset
    ///
    /// Pixels are scaled so that dragging across the full view height moves
    /// the target by the visible height at the target's distance.
    fn resolve_pan<C: OrbitCamera>(&mut self, camera: &C) {
        let (dx, dy) = self.pending_pan;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.pending_pan = (0.0, 0.0);

        let distance = (camera.position() - self.target).length() * (camera.fov_y() / 2.0).tan();
        let per_pixel = 2.0 * distance / self.viewport_height;
        self.pan_offset += camera.right() * (-dx * per_pixel);
        self.pan_offset += camera.up() * (dy * per_pixel);
    }

    fn clear_motion(&mut self) {
        self.spherical_delta = Spherical::default();
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
        self.pending_pan = (0.0, 0.0);
    }
}

/// Camera operations the orbit controls need
///
/// Allows the controls to drive different camera implementations.
pub trait OrbitCamera {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    /// Re-aim the camera at a point (y stays up)
    fn look_at(&mut self, target: Vec3);
    /// Vertical field of view in radians
    fn fov_y(&self) -> f32;
    /// Camera right direction in world space
    fn right(&self) -> Vec3;
    /// Camera up direction in world space
    fn up(&self) -> Vec3;
}
