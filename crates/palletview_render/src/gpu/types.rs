//! GPU data types for the scene pipelines
//!
//! These types are shared between Rust and WGSL and must match the shader
//! struct layouts exactly.

use bytemuck::{Pod, Zeroable};
use palletview_core::{Color, Light, Material, SceneGraph, SceneNode};
use palletview_math::{mat4, Mat4, Vec3};

/// Mesh or line vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                // normal: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }
    }
}

/// Per-frame uniforms
/// Layout: 240 bytes total (must match scene.wgsl Globals)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// Camera position (w unused)
    pub camera_pos: [f32; 4],
    /// Ambient radiance (rgb already scaled by intensity)
    pub ambient: [f32; 4],
    /// Direction towards the key light
    pub key_dir: [f32; 4],
    pub key_color: [f32; 4],
    /// Direction towards the fill light
    pub fill_dir: [f32; 4],
    pub fill_color: [f32; 4],
    /// x: depth bias, y: shadow texel size, z: 1 when the key light casts shadows
    pub shadow: [f32; 4],
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            view_proj: mat4::IDENTITY,
            light_view_proj: mat4::IDENTITY,
            camera_pos: [0.0; 4],
            ambient: [0.0; 4],
            key_dir: [0.0, 1.0, 0.0, 0.0],
            key_color: [0.0; 4],
            fill_dir: [0.0, 1.0, 0.0, 0.0],
            fill_color: [0.0; 4],
            shadow: [0.0; 4],
        }
    }
}

impl GlobalUniforms {
    /// Fill the lighting terms from the scene's lights
    ///
    /// Ambient lights add up. The first two directional lights take the key
    /// and fill slots; only the key light's shadow is honored.
    pub fn with_lights(mut self, scene: &SceneGraph, light_view_proj: Mat4, linear: bool) -> Self {
        let mut ambient = [0.0f32; 3];
        let mut directional = Vec::new();
        for light in scene.lights() {
            match light {
                Light::Ambient { color, intensity } => {
                    let c = shader_color(*color, linear).scaled(*intensity);
                    ambient[0] += c.r;
                    ambient[1] += c.g;
                    ambient[2] += c.b;
                }
                Light::Directional(light) => directional.push(*light),
            }
        }
        if directional.len() > 2 {
            log::debug!("{} directional lights, only two are shaded", directional.len());
        }

        self.ambient = [ambient[0], ambient[1], ambient[2], 0.0];
        if let Some(key) = directional.first() {
            self.key_dir = direction_to(-key.direction());
            self.key_color = shader_color(key.color, linear).scaled(key.intensity).with_alpha(0.0);
            if let Some(shadow) = key.shadow {
                self.light_view_proj = light_view_proj;
                self.shadow = [shadow.bias, 1.0 / shadow.map_size.max(1) as f32, 1.0, 0.0];
            }
        }
        if let Some(fill) = directional.get(1) {
            self.fill_dir = direction_to(-fill.direction());
            self.fill_color = shader_color(fill.color, linear).scaled(fill.intensity).with_alpha(0.0);
        }
        self
    }
}

fn direction_to(v: Vec3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

/// Per-node uniforms
/// Layout: 96 bytes total (must match scene.wgsl Node)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct NodeUniforms {
    pub model: [[f32; 4]; 4],
    /// Linear rgb and alpha
    pub color: [f32; 4],
    /// x: shading index, y: 1 when receiving shadows, z: shininess
    pub params: [f32; 4],
}

impl NodeUniforms {
    /// Phong specular exponent
    pub const SHININESS: f32 = 30.0;

    pub fn from_node(node: &SceneNode, linear: bool) -> Self {
        Self::new(node.matrix(), node.material(), node.receives_shadow(), linear)
    }

    pub fn new(model: &Mat4, material: &Material, receive_shadow: bool, linear: bool) -> Self {
        Self {
            model: *model,
            color: shader_color(material.color, linear).with_alpha(material.effective_alpha()),
            params: [
                material.shading.shader_index() as f32,
                if receive_shadow { 1.0 } else { 0.0 },
                Self::SHININESS,
                0.0,
            ],
        }
    }
}

/// Convert one sRGB-encoded channel to linear
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Color as the shader expects it for the surface format
pub fn shader_color(color: Color, linear: bool) -> Color {
    if linear {
        Color::new(srgb_to_linear(color.r), srgb_to_linear(color.g), srgb_to_linear(color.b))
    } else {
        color
    }
}

/// Clear color for the render pass
pub fn clear_color(color: Color, linear: bool) -> wgpu::Color {
    let c = shader_color(color, linear);
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palletview_core::{LightingConfig, Shading};

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<GlobalUniforms>(), 240);
        assert_eq!(std::mem::size_of::<NodeUniforms>(), 96);
    }

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < EPSILON);
        assert!((srgb_to_linear(0.5) - 0.21404).abs() < 0.001);
    }

    #[test]
    fn test_lights_fill_slots() {
        let mut scene = SceneGraph::default();
        for light in LightingConfig::default().lights(1024) {
            scene.add_light(light);
        }
        let globals = GlobalUniforms::default().with_lights(&scene, mat4::IDENTITY, false);

        // 0x40 / 255 * 0.6
        assert!((globals.ambient[0] - 0.2510 * 0.6).abs() < 0.001);
        assert!((globals.key_color[0] - 0.8).abs() < EPSILON);
        assert!((globals.fill_color[0] - 0.3).abs() < EPSILON);
        // Key light sits at +x +y +z
        assert!(globals.key_dir[0] > 0.0 && globals.key_dir[1] > 0.0);
        assert!(globals.fill_dir[1] < 0.0);
        assert_eq!(globals.shadow[2], 1.0);
        assert!((globals.shadow[1] - 1.0 / 1024.0).abs() < EPSILON);
    }

    #[test]
    fn test_node_uniforms_alpha() {
        let mut material = Material::new(Shading::Basic, Color::WHITE);
        material.opacity = 0.5;
        let opaque = NodeUniforms::new(&mat4::IDENTITY, &material, false, false);
        assert_eq!(opaque.color[3], 1.0);
        assert_eq!(opaque.params[0], 3.0);

        material.transparent = true;
        let blended = NodeUniforms::new(&mat4::IDENTITY, &material, true, false);
        assert_eq!(blended.color[3], 0.5);
        assert_eq!(blended.params[1], 1.0);
    }
}
