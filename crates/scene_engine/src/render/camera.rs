//! # Camera
//!
//! The scene only needs a view-projection matrix from whichever camera is
//! active. [`Camera`] is a perspective look-at camera providing one.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Anything that can provide a combined view-projection matrix
pub trait ViewProjection {
    /// `projection * view`
    fn view_projection(&self) -> Mat4;
}

/// Perspective camera
///
/// Right-handed, Y-up, looking from `position` towards `target`. Projection
/// uses OpenGL clip-space depth.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Move the camera, keeping its target
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Point the camera at `target` with the given up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Update the aspect ratio after a viewport change
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Camera-to-clip transform
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_gl(self.fov, self.aspect, self.near, self.far)
    }
}

impl ViewProjection for Camera {
    fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
