//! Scene lighting

use serde::{Serialize, Deserialize};
use palletview_math::Vec3;

use crate::color::Color;

/// Shadow map settings for a directional light
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSettings {
    /// Width and height of the depth map in texels
    pub map_size: u32,
    /// Depth bias applied when sampling
    pub bias: f32,
}

/// Light aimed from a position towards a target (parallel rays)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub shadow: Option<ShadowSettings>,
}

impl DirectionalLight {
    /// Unit vector the light travels along
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalized()
    }
}

/// A light in the scene graph
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Uniform light from every direction
    Ambient { color: Color, intensity: f32 },
    Directional(DirectionalLight),
}

/// Fixed lighting rig: ambient, shadow-casting key light and a fill light
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub key_color: Color,
    pub key_intensity: f32,
    pub key_position: [f32; 3],
    pub fill_color: Color,
    pub fill_intensity: f32,
    pub fill_position: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Color::from_hex(0x404040),
            ambient_intensity: 0.6,
            key_color: Color::WHITE,
            key_intensity: 0.8,
            key_position: [10.0, 10.0, 5.0],
            fill_color: Color::WHITE,
            fill_intensity: 0.3,
            fill_position: [-10.0, -10.0, -5.0],
        }
    }
}

impl LightingConfig {
    /// Default depth-map resolution of the key light
    pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 2048;

    /// Build the light list (ambient, key, fill)
    pub fn lights(&self, shadow_map_size: u32) -> Vec<Light> {
        vec![
            Light::Ambient {
                color: self.ambient_color,
                intensity: self.ambient_intensity,
            },
            Light::Directional(DirectionalLight {
                color: self.key_color,
                intensity: self.key_intensity,
                position: Vec3::from_array(self.key_position),
                target: Vec3::ZERO,
                shadow: Some(ShadowSettings {
                    map_size: shadow_map_size,
                    bias: 0.0005,
                }),
            }),
            Light::Directional(DirectionalLight {
                color: self.fill_color,
                intensity: self.fill_intensity,
                position: Vec3::from_array(self.fill_position),
                target: Vec3::ZERO,
                shadow: None,
            }),
        ]
    }
}
