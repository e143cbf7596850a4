use glam::Vec3;
use crate::model::Camera;

/// Step sizes for keyboard and mouse camera control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// World units per movement key press
    pub move_step: f32,
    /// Radians per yaw key press
    pub yaw_step: f32,
    /// Radians per pixel of horizontal mouse motion
    pub mouse_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_step: 0.3,
            yaw_step: 5f32.to_radians(),
            mouse_sensitivity: 0.002,
        }
    }
}

/// Discrete camera actions produced by key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraCommand {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    YawLeft,
    YawRight,
    Ascend,
    Descend,
}

/// Handles camera movement and orientation
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    pub settings: CameraSettings,
}

impl CameraController {
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }

    /// Translate eye and target by one step along `direction`
    pub fn move_by(&self, camera: &mut Camera, direction: Vec3) {
        let Some(dir) = direction.try_normalize() else { return };
        camera.translate(dir * self.settings.move_step);
    }

    /// Step sideways; positive `sign` moves to the camera's right
    pub fn strafe(&self, camera: &mut Camera, sign: f32) {
        let view_dir = (camera.at - camera.eye).normalize();
        let right = view_dir.cross(camera.up).normalize();
        self.move_by(camera, right * sign);
    }

    /// Turn by one yaw step; positive `sign` turns left
    pub fn yaw_key(&self, camera: &mut Camera, sign: f32) {
        camera.rotate_about_up(sign * self.settings.yaw_step);
    }

    /// Apply horizontal mouse motion. Only yaw is affected.
    pub fn mouse_look(&self, camera: &mut Camera, delta_x: f32) {
        camera.rotate_about_up(-delta_x * self.settings.mouse_sensitivity);
    }

    pub fn apply(&self, camera: &mut Camera, command: CameraCommand) {
        match command {
            CameraCommand::MoveForward => {
                let forward = camera.forward;
                self.move_by(camera, forward);
            }
            CameraCommand::MoveBackward => {
                let forward = camera.forward;
                self.move_by(camera, -forward);
            }
            CameraCommand::StrafeLeft => self.strafe(camera, -1.0),
            CameraCommand::StrafeRight => self.strafe(camera, 1.0),
            CameraCommand::YawLeft => self.yaw_key(camera, 1.0),
            CameraCommand::YawRight => self.yaw_key(camera, -1.0),
            CameraCommand::Ascend => {
                let up = camera.up;
                self.move_by(camera, up);
            }
            CameraCommand::Descend => {
                let up = camera.up;
                self.move_by(camera, -up);
            }
        }
    }
}
