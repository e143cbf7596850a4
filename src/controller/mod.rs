// CONTROLLER: Input and frame scheduling
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputProcessor, KeyBindings};
pub use camera_controller::{CameraCommand, CameraController, CameraSettings};
pub use frame_loop::{CameraUniform, FrameData, FrameLoopContext};
