/// Platform-agnostic input handling system
use crate::controller::CameraCommand;

/// Platform-independent input events. Keys are W3C `KeyboardEvent.code`
/// names ("KeyW", "Space", "ShiftLeft", ...), which winit's `KeyCode` shares.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseMove { dx: f32, dy: f32 },
    PointerLockChanged { locked: bool },
    FocusLost,
    Resized { width: u32, height: u32 },
}

/// Pointer-lock state. Movement keys act on `KeyDown`, so no held-key set is kept.
#[derive(Debug, Default)]
pub struct InputState {
    pub pointer_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track lock state for an event. Losing focus always releases the lock.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
            InputEvent::FocusLost => self.pointer_locked = false,
            InputEvent::KeyDown(_)
            | InputEvent::KeyUp(_)
            | InputEvent::MouseMove { .. }
            | InputEvent::Resized { .. } => {}
        }
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub yaw_left: String,
    pub yaw_right: String,
    pub up: String,
    pub down: String,
    pub release_pointer: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "KeyW".to_string(),
            backward: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
            yaw_left: "KeyQ".to_string(),
            yaw_right: "KeyE".to_string(),
            up: "Space".to_string(),
            down: "ShiftLeft".to_string(),
            release_pointer: "Escape".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn command_for(&self, code: &str) -> Option<CameraCommand> {
        let b = &self.bindings;
        let command = if code == b.forward {
            CameraCommand::MoveForward
        } else if code == b.backward {
            CameraCommand::MoveBackward
        } else if code == b.left {
            CameraCommand::StrafeLeft
        } else if code == b.right {
            CameraCommand::StrafeRight
        } else if code == b.yaw_left {
            CameraCommand::YawLeft
        } else if code == b.yaw_right {
            CameraCommand::YawRight
        } else if code == b.up {
            CameraCommand::Ascend
        } else if code == b.down {
            CameraCommand::Descend
        } else {
            return None;
        };
        Some(command)
    }

    pub fn is_release_pointer(&self, code: &str) -> bool {
        code == self.bindings.release_pointer
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use winit::keyboard::KeyCode;

    /// W3C code name for the keys the viewer reacts to
    pub fn key_code_name(code: KeyCode) -> Option<&'static str> {
        let name = match code {
            KeyCode::KeyW => "KeyW",
            KeyCode::KeyA => "KeyA",
            KeyCode::KeyS => "KeyS",
            KeyCode::KeyD => "KeyD",
            KeyCode::KeyQ => "KeyQ",
            KeyCode::KeyE => "KeyE",
            KeyCode::Space => "Space",
            KeyCode::ShiftLeft => "ShiftLeft",
            KeyCode::Escape => "Escape",
            _ => return None,
        };
        Some(name)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown(code)
        } else {
            InputEvent::KeyUp(code)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove { dx: e.movement_x() as f32, dy: e.movement_y() as f32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_every_command() {
        let p = InputProcessor::default();
        let table = [
            ("KeyW", CameraCommand::MoveForward),
            ("KeyS", CameraCommand::MoveBackward),
            ("KeyA", CameraCommand::StrafeLeft),
            ("KeyD", CameraCommand::StrafeRight),
            ("KeyQ", CameraCommand::YawLeft),
            ("KeyE", CameraCommand::YawRight),
            ("Space", CameraCommand::Ascend),
            ("ShiftLeft", CameraCommand::Descend),
        ];
        for (code, cmd) in table {
            assert_eq!(p.command_for(code), Some(cmd), "{code}");
        }
        assert_eq!(p.command_for("KeyZ"), None);
        assert_eq!(p.command_for("ShiftRight"), None);
        assert!(p.is_release_pointer("Escape"));
    }

    #[test]
    fn custom_bindings() {
        let bindings = KeyBindings { forward: "ArrowUp".to_string(), ..KeyBindings::default() };
        let p = InputProcessor::new(bindings);
        assert_eq!(p.command_for("ArrowUp"), Some(CameraCommand::MoveForward));
        assert_eq!(p.command_for("KeyW"), None);
    }

    #[test]
    fn state_tracks_pointer_lock() {
        let mut state = InputState::new();
        assert!(!state.pointer_locked);

        state.process_event(&InputEvent::PointerLockChanged { locked: true });
        state.process_event(&InputEvent::KeyDown("KeyW".into()));
        assert!(state.pointer_locked);
        state.process_event(&InputEvent::PointerLockChanged { locked: false });
        assert!(!state.pointer_locked);
    }

    #[test]
    fn focus_loss_releases_pointer_lock() {
        let mut state = InputState::new();
        state.process_event(&InputEvent::PointerLockChanged { locked: true });
        state.process_event(&InputEvent::FocusLost);
        assert!(!state.pointer_locked);
    }
}
