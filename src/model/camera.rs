use glam::{Mat4, Quat, Vec3};

/// First-person camera. `at` is always `eye + forward` after a rotation and
/// moves together with `eye` on translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub at: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let eye = Vec3::new(0.0, 2.0, -5.0);
        let forward = Vec3::Z;
        Self {
            eye,
            forward,
            up: Vec3::Y,
            at: eye + forward,
            fov_y: 45f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) { self.aspect = width as f32 / height.max(1) as f32; }

    /// Translate eye and target together
    pub fn translate(&mut self, offset: Vec3) {
        self.eye += offset;
        self.at += offset;
    }

    /// Rotate `forward` about world up by `angle` radians
    pub fn rotate_about_up(&mut self, angle: f32) {
        let rotated = Quat::from_axis_angle(self.up, angle) * self.forward;
        // renormalize against drift
        self.forward = rotated.normalize();
        self.at = self.eye + self.forward;
    }

    pub fn view_matrix(&self) -> Mat4 { Mat4::look_at_rh(self.eye, self.at, self.up) }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    /// Right-handed look-at written out from its definition
    fn reference_look_at(eye: Vec3, at: Vec3, up: Vec3) -> Mat4 {
        let f = (at - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);
        Mat4::from_cols_array(&[
            s.x, u.x, -f.x, 0.0,
            s.y, u.y, -f.y, 0.0,
            s.z, u.z, -f.z, 0.0,
            -s.dot(eye), -u.dot(eye), f.dot(eye), 1.0,
        ])
    }

    #[test]
    fn initial_state() {
        let cam = Camera::new(800, 600);
        assert_eq!(cam.eye, Vec3::new(0.0, 2.0, -5.0));
        assert_eq!(cam.at, cam.eye + cam.forward);
        assert_eq!(cam.up, Vec3::Y);
        assert!((cam.aspect - 800.0 / 600.0).abs() < EPS);
    }

    #[test]
    fn view_matrix_matches_reference_look_at() {
        let mut cam = Camera::new(800, 600);
        cam.at = Vec3::new(0.0, 2.0, 0.0);
        let expected = reference_look_at(Vec3::new(0.0, 2.0, -5.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
        assert_mat_eq(cam.view_matrix(), expected);

        // Eye maps to the origin, target lies on -Z in view space
        let eye_view = cam.view_matrix().transform_point3(cam.eye);
        assert!(eye_view.length() < EPS);
        let at_view = cam.view_matrix().transform_point3(cam.at);
        assert!((at_view - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn view_matrix_is_deterministic() {
        let cam = Camera::new(800, 600);
        assert_eq!(cam.view_matrix(), cam.view_matrix());
    }

    #[test]
    fn rotation_keeps_forward_unit_and_target_in_sync() {
        let mut cam = Camera::new(800, 600);
        for _ in 0..1000 {
            cam.rotate_about_up(0.37);
            assert!((cam.forward.length() - 1.0).abs() < EPS);
            assert!((cam.at - (cam.eye + cam.forward)).length() < 1e-5);
        }
        assert!(cam.forward.y.abs() < EPS);
    }
}
