//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`PV_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use palletview_core::{Color, GraphBuilder, LightingConfig, Vec3};
use palletview_render::{ControlSettings, FramingConfig, ViewerSettings, SNAPSHOT_SIZE};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Orbit controls configuration
    #[serde(default)]
    pub controls: ControlsConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Scene configuration
    #[serde(default)]
    pub scene: SceneConfig,
    /// Offscreen snapshot configuration
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`PV_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Optional user overrides
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // PV_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("PV_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Settings for the scene viewer
    pub fn to_viewer_settings(&self) -> ViewerSettings {
        ViewerSettings {
            background: self.rendering.background_color,
            fov_degrees: self.camera.fov,
            near: self.camera.near,
            far: self.camera.far,
            framing: FramingConfig {
                distance_factor: self.camera.framing_distance,
                direction: Vec3::from_array(self.camera.framing_direction),
            },
            controls: ControlSettings {
                enable_damping: self.controls.enable_damping,
                damping_factor: self.controls.damping_factor,
                rotate_speed: self.controls.rotate_speed,
                zoom_speed: self.controls.zoom_speed,
                pan_speed: self.controls.pan_speed,
                min_distance: self.controls.min_distance,
                max_distance: self.controls.max_distance,
            },
            lighting: self.rendering.lighting.clone(),
            shadow_map_size: self.rendering.shadow_map_size,
            vsync: self.window.vsync,
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Palletview".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Camera distance as a multiple of the scene's largest extent
    pub framing_distance: f32,
    /// Offset direction from the scene center [x, y, z]
    pub framing_direction: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        let framing = FramingConfig::default();
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            framing_distance: framing.distance_factor,
            framing_direction: framing.direction.to_array(),
        }
    }
}

/// Orbit controls configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Glide after the mouse is released
    pub enable_damping: bool,
    /// Fraction of pending motion applied per frame
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Closest zoom distance to the target
    pub min_distance: f32,
    /// Farthest zoom distance to the target
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        let controls = ControlSettings::default();
        Self {
            enable_damping: controls.enable_damping,
            damping_factor: controls.damping_factor,
            rotate_speed: controls.rotate_speed,
            zoom_speed: controls.zoom_speed,
            pan_speed: controls.pan_speed,
            min_distance: controls.min_distance,
            max_distance: controls.max_distance,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Background color (`0xRRGGBB` or `"#rrggbb"`)
    pub background_color: Color,
    /// Key-light shadow map resolution
    pub shadow_map_size: u32,
    /// Ambient, key and fill lights
    pub lighting: LightingConfig,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: Color::from_hex(GraphBuilder::DEFAULT_BACKGROUND),
            shadow_map_size: LightingConfig::DEFAULT_SHADOW_MAP_SIZE,
            lighting: LightingConfig::default(),
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene document loaded when no path is given on the command line
    pub path: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: "demos/pallet_scene.json".to_string(),
        }
    }
}

/// Offscreen snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Directory PNG files are written to, created on first use
    pub directory: String,
}

impl SnapshotConfig {
    /// Path of the `index`-th snapshot of the scene named `stem`
    pub fn file_path(&self, stem: &str, index: u32) -> PathBuf {
        Path::new(&self.directory).join(format!("{}_{:03}.png", stem, index))
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            width: SNAPSHOT_SIZE.0,
            height: SNAPSHOT_SIZE.1,
            directory: "snapshots".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log document validation issues before building the viewer
    pub validate_scene: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            validate_scene: true,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
