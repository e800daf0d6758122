use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: 0.75,
            aspect_ratio: 800. / 600.,
            near: 0.1,
            far: 100.,
        }
    }
}

impl Camera {
    pub const MIN_FOV_Y: f32 = PI / 12.;
    pub const MAX_FOV_Y: f32 = PI * 2. / 3.;

    /// Looks down `-Z` when unrotated.
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Yaw and pitch by the given angles, keeping the camera upright.
    pub fn look(&mut self, yaw: f32, pitch: f32) {
        let (y, x, z) = self.rotation.to_euler(EulerRot::YXZ);
        let x = (x + pitch).clamp(PI * -0.49, PI * 0.49);
        self.rotation = Quat::from_euler(EulerRot::YXZ, y + yaw, x, z);
    }

    /// `local.x` moves right, `local.z` moves forward.
    pub fn translate_local(&mut self, local: Vec3) {
        self.position += self.right() * local.x + Vec3::Y * local.y + self.forward() * local.z;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.fov_y = (self.fov_y + delta).clamp(Self::MIN_FOV_Y, Self::MAX_FOV_Y);
    }
}
