//! Palletview - packing result viewer
//!
//! Opens a window showing a scene document (container outline plus placed
//! boxes) as an interactive 3D view.
//!
//! Usage: `palletview [scene.json]`
//!
//! Keys: R reset camera, W wireframe, C container only, Left/Right step
//! through the packing order, P save a snapshot, F fullscreen, Escape quit.

use std::path::{Path, PathBuf};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use palletview::config::AppConfig;
use palletview::input::{InputAction, InputMapper};
use palletview::systems::WindowSystem;
use palletview_core::{DocumentValidator, SceneDocument};
use palletview_render::{init_viewer, SceneInput, Viewer, WgpuBackend, WindowHost};

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    scene_path: PathBuf,
    /// Scene text, handed to the viewer once the window exists
    scene_text: Option<String>,
    window: Option<WindowSystem>,
    viewer: Option<Viewer<WgpuBackend>>,
    /// Snapshots saved this run
    snapshots_taken: u32,
}

impl App {
    fn new(config: AppConfig, scene_path: PathBuf, scene_text: String) -> Self {
        Self {
            config,
            scene_path,
            scene_text: Some(scene_text),
            window: None,
            viewer: None,
            snapshots_taken: 0,
        }
    }

    /// Parse the scene up front so validation issues can be reported
    fn scene_input(&self, text: String) -> SceneInput {
        if !self.config.debug.validate_scene {
            return SceneInput::Text(text);
        }
        match SceneDocument::from_json(&text) {
            Ok(doc) => {
                let issues = DocumentValidator::validate(&doc);
                for issue in &issues {
                    log::warn!("Scene validation: {}", issue);
                }
                log::info!(
                    "Loaded scene '{}': {} material(s), {} geometries, {} object(s), {} issue(s)",
                    self.scene_path.display(),
                    doc.materials.len(),
                    doc.geometries.len(),
                    doc.objects.len(),
                    issues.len()
                );
                SceneInput::Document(doc)
            }
            // The viewer reports the parse error
            Err(_) => SceneInput::Text(text),
        }
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        let Some(viewer) = self.viewer.as_mut() else { return };
        match action {
            InputAction::ResetCamera => {
                viewer.reset_camera();
                log::info!("Camera reset");
            }
            InputAction::ToggleWireframe => viewer.toggle_wireframe(),
            InputAction::ShowOnlyContainer => viewer.show_only_container(),
            InputAction::StepForward | InputAction::StepBack => {
                let shown = if action == InputAction::StepForward {
                    viewer.step_forward()
                } else {
                    viewer.step_back()
                };
                log::info!("Showing {} of {} box(es)", shown, viewer.box_count());
            }
            InputAction::SaveSnapshot => self.save_snapshot(),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::Exit => {
                viewer.dispose();
                event_loop.exit();
            }
        }
    }
}

impl App {
    /// Render offscreen at the configured size and write a PNG
    fn save_snapshot(&mut self) {
        let Some(viewer) = self.viewer.as_mut() else { return };
        let settings = &self.config.snapshot;
        let snapshot = match viewer.snapshot(settings.width, settings.height) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Snapshot failed: {}", e);
                return;
            }
        };

        if let Err(e) = std::fs::create_dir_all(&settings.directory) {
            log::error!("Failed to create snapshot directory '{}': {}", settings.directory, e);
            return;
        }
        let stem = self
            .scene_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scene".to_string());
        self.snapshots_taken += 1;
        let path = settings.file_path(&stem, self.snapshots_taken);
        match snapshot.save_png(&path) {
            Ok(()) => log::info!("Saved snapshot to {}", path.display()),
            Err(e) => log::error!("Failed to save snapshot '{}': {}", path.display(), e),
        }
    }
}

fn scene_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(text) = self.scene_text.take() else { return };

        let window = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let host = WindowHost::new(window.window().clone());
        let input = self.scene_input(text);
        let Some(viewer) = init_viewer(&host, input, self.config.to_viewer_settings()) else {
            event_loop.exit();
            return;
        };

        window.update_title(&scene_name(&self.scene_path), viewer.scene().node_count());
        window.request_redraw();
        self.window = Some(window);
        self.viewer = Some(viewer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.dispose();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                        self.handle_action(action, event_loop);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_mouse_button(button, state);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_scroll(delta);
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(viewer) = &mut self.viewer else { return };
                // Request next frame only while the viewer is running
                if viewer.frame() {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                } else if viewer.is_disposed() {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some(viewer) = &mut self.viewer {
                viewer.handle_mouse_motion(delta.0, delta.1);
            }
        }
    }
}

fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting Palletview");

    let scene_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.scene.path));
    let scene_text = match std::fs::read_to_string(&scene_path) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to read scene '{}': {}", scene_path.display(), e);
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, scene_path, scene_text);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
