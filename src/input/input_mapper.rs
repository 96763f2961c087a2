//! Input mapping from raw events to semantic actions
//!
//! Maps keyboard input to viewer actions like ResetCamera, Exit, etc.
//! Mouse buttons, motion and wheel are NOT mapped here - they go directly to
//! the viewer's orbit controls.

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Actions triggered by keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Reframe the whole scene (R key)
    ResetCamera,
    /// Toggle wireframe on every mesh (W key)
    ToggleWireframe,
    /// Hide or restore everything except the container outline (C key)
    ShowOnlyContainer,
    /// Reveal the next box in packing order (Right arrow)
    StepForward,
    /// Hide the last revealed box (Left arrow)
    StepBack,
    /// Save an offscreen render as a PNG (P key)
    SaveSnapshot,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
    /// Dispose the viewer and exit (Escape)
    Exit,
}

/// Maps raw input events to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `Some(action)` for shortcut keys, `None` otherwise
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        // Only handle key presses, not releases
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::KeyR => Some(InputAction::ResetCamera),
            KeyCode::KeyW => Some(InputAction::ToggleWireframe),
            KeyCode::KeyC => Some(InputAction::ShowOnlyContainer),
            KeyCode::ArrowRight => Some(InputAction::StepForward),
            KeyCode::ArrowLeft => Some(InputAction::StepBack),
            KeyCode::KeyP => Some(InputAction::SaveSnapshot),
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            KeyCode::Escape => Some(InputAction::Exit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_keys() {
        let cases = [
            (KeyCode::KeyR, InputAction::ResetCamera),
            (KeyCode::KeyW, InputAction::ToggleWireframe),
            (KeyCode::KeyC, InputAction::ShowOnlyContainer),
            (KeyCode::ArrowRight, InputAction::StepForward),
            (KeyCode::ArrowLeft, InputAction::StepBack),
            (KeyCode::KeyP, InputAction::SaveSnapshot),
            (KeyCode::KeyF, InputAction::ToggleFullscreen),
            (KeyCode::Escape, InputAction::Exit),
        ];
        for (key, expected) in cases {
            assert_eq!(InputMapper::map_keyboard(key, ElementState::Pressed), Some(expected));
        }
    }

    #[test]
    fn test_key_release_ignored() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Released);
        assert_eq!(action, None);
    }

    #[test]
    fn test_other_keys_not_mapped() {
        for key in [KeyCode::KeyA, KeyCode::KeyS, KeyCode::Space, KeyCode::ArrowUp] {
            let action = InputMapper::map_keyboard(key, ElementState::Pressed);
            assert_eq!(action, None, "Key {:?} should not be mapped", key);
        }
    }
}
