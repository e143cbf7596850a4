use tracing::{debug, trace, warn};

use crate::controller::{CameraController, InputEvent, InputProcessor, InputState};
use crate::model::{CubeInstance, Scene};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub camera: CameraUniform,
    pub cubes: Vec<CubeInstance>,
}

/// Routes input into the scene and decides when a frame must be drawn
pub struct FrameLoopContext {
    pub scene: Scene,
    pub input_state: InputState,
    pub input_processor: InputProcessor,
    pub camera_controller: CameraController,
    texture_ready: bool,
    halted: bool,
}

impl FrameLoopContext {
    pub fn new(scene: Scene, input_processor: InputProcessor, camera_controller: CameraController) -> Self {
        Self {
            scene,
            input_state: InputState::new(),
            input_processor,
            camera_controller,
            texture_ready: false,
            halted: false,
        }
    }

    /// Apply one input event. Returns true if the scene changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        self.input_state.process_event(event);

        let changed = match event {
            InputEvent::KeyDown(code) => match self.input_processor.command_for(code) {
                Some(command) => {
                    self.camera_controller.apply(&mut self.scene.camera, command);
                    trace!(?command, eye = ?self.scene.camera.eye, "camera command");
                    true
                }
                None => false,
            },
            InputEvent::MouseMove { dx, .. } => {
                if self.input_state.pointer_locked && *dx != 0.0 {
                    self.camera_controller.mouse_look(&mut self.scene.camera, *dx);
                    true
                } else {
                    false
                }
            }
            InputEvent::Resized { width, height } => {
                self.scene.camera.set_aspect(*width, *height);
                debug!(width, height, "viewport resized");
                true
            }
            InputEvent::KeyUp(_) | InputEvent::PointerLockChanged { .. } | InputEvent::FocusLost => false,
        };

        if changed {
            self.scene.mark_dirty();
        }
        changed
    }

    /// Whether `code` should release pointer lock
    pub fn wants_pointer_release(&self, code: &str) -> bool {
        self.input_processor.is_release_pointer(code)
    }

    pub fn mark_texture_ready(&mut self) {
        self.texture_ready = true;
        self.scene.mark_dirty();
    }

    /// Force a redraw, e.g. after the surface was lost
    pub fn request_redraw(&mut self) { self.scene.mark_dirty(); }

    /// Stop handing out frames for good after a fatal render error
    pub fn halt(&mut self) {
        if !self.halted {
            warn!("rendering halted");
        }
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool { self.halted }

    /// Data for the next frame if a redraw is pending. Clears the pending flag.
    pub fn take_frame(&mut self) -> Option<FrameData> {
        if self.halted || !self.texture_ready || !self.scene.take_dirty() {
            return None;
        }
        Some(FrameData {
            camera: CameraUniform { view_proj: self.scene.camera.view_proj().to_cols_array_2d() },
            cubes: self.scene.compose(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Camera, HeightMap, SceneStyle, TERRACED_HILL};

    fn context() -> FrameLoopContext {
        let scene = Scene::new(Camera::new(800, 600), HeightMap::from_rows(&TERRACED_HILL).unwrap(), SceneStyle::default());
        FrameLoopContext::new(scene, InputProcessor::default(), CameraController::default())
    }

    #[test]
    fn nothing_is_drawn_before_texture_loads() {
        let mut ctx = context();
        assert!(ctx.take_frame().is_none());
        ctx.handle_event(&InputEvent::KeyDown("KeyW".into()));
        assert!(ctx.take_frame().is_none());

        ctx.mark_texture_ready();
        assert!(ctx.take_frame().is_some());
        assert!(ctx.take_frame().is_none());
    }

    #[test]
    fn bursts_of_input_produce_one_frame() {
        let mut ctx = context();
        ctx.mark_texture_ready();
        ctx.take_frame();

        for _ in 0..5 {
            assert!(ctx.handle_event(&InputEvent::KeyDown("KeyD".into())));
        }
        assert!(ctx.take_frame().is_some());
        assert!(ctx.take_frame().is_none());
    }

    #[test]
    fn unbound_keys_do_not_redraw() {
        let mut ctx = context();
        ctx.mark_texture_ready();
        ctx.take_frame();

        assert!(!ctx.handle_event(&InputEvent::KeyDown("KeyX".into())));
        assert!(!ctx.handle_event(&InputEvent::KeyUp("KeyW".into())));
        assert!(ctx.take_frame().is_none());
    }

    #[test]
    fn mouse_look_requires_pointer_lock() {
        let mut ctx = context();
        ctx.mark_texture_ready();
        ctx.take_frame();
        let forward = ctx.scene.camera.forward;

        assert!(!ctx.handle_event(&InputEvent::MouseMove { dx: 40.0, dy: 0.0 }));
        assert_eq!(ctx.scene.camera.forward, forward);

        ctx.handle_event(&InputEvent::PointerLockChanged { locked: true });
        assert!(ctx.handle_event(&InputEvent::MouseMove { dx: 40.0, dy: 12.0 }));
        assert_ne!(ctx.scene.camera.forward, forward);
        assert!(ctx.take_frame().is_some());

        // vertical motion alone changes nothing
        assert!(!ctx.handle_event(&InputEvent::MouseMove { dx: 0.0, dy: 30.0 }));
    }

    #[test]
    fn unchanged_state_redraws_identically() {
        let mut ctx = context();
        ctx.mark_texture_ready();
        let first = ctx.take_frame().unwrap();
        ctx.request_redraw();
        let second = ctx.take_frame().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn halted_loop_never_hands_out_another_frame() {
        let mut ctx = context();
        ctx.mark_texture_ready();
        assert!(ctx.take_frame().is_some());

        ctx.halt();
        assert!(ctx.handle_event(&InputEvent::KeyDown("KeyW".into())));
        ctx.request_redraw();
        assert!(ctx.is_halted());
        assert!(ctx.take_frame().is_none());
    }

    #[test]
    fn resize_updates_aspect() {
        let mut ctx = context();
        assert!(ctx.handle_event(&InputEvent::Resized { width: 1000, height: 500 }));
        assert!((ctx.scene.camera.aspect - 2.0).abs() < 1e-6);
    }
}
