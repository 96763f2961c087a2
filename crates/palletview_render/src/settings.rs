//! Viewer settings

use palletview_core::{Color, GraphBuilder, LightingConfig};
use palletview_input::OrbitControls;

use crate::framing::FramingConfig;

/// Orbit control tuning
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSettings {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

impl ControlSettings {
    /// Build orbit controls with these settings
    pub fn build(&self) -> OrbitControls {
        OrbitControls::new()
            .with_damping(self.enable_damping, self.damping_factor)
            .with_rotate_speed(self.rotate_speed)
            .with_zoom_speed(self.zoom_speed)
            .with_pan_speed(self.pan_speed)
            .with_distance_limits(self.min_distance, self.max_distance)
    }
}

/// Everything a [`Viewer`](crate::Viewer) is constructed with
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerSettings {
    pub background: Color,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub framing: FramingConfig,
    pub controls: ControlSettings,
    pub lighting: LightingConfig,
    pub shadow_map_size: u32,
    pub vsync: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            background: Color::from_hex(GraphBuilder::DEFAULT_BACKGROUND),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            framing: FramingConfig::default(),
            controls: ControlSettings::default(),
            lighting: LightingConfig::default(),
            shadow_map_size: LightingConfig::DEFAULT_SHADOW_MAP_SIZE,
            vsync: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_built_from_settings() {
        let settings = ControlSettings {
            enable_damping: false,
            zoom_speed: 2.0,
            ..Default::default()
        };
        let controls = settings.build();
        assert!(!controls.enable_damping);
        assert_eq!(controls.zoom_speed, 2.0);
        assert_eq!(controls.damping_factor, 0.05);
    }

    #[test]
    fn test_default_viewer_settings() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.background.to_hex(), 0xf0f0f0);
        assert_eq!(settings.fov_degrees, 75.0);
        assert_eq!(settings.shadow_map_size, 2048);
    }
}
