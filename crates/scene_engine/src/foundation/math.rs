//! Math utilities and types
//!
//! Provides fundamental math types for 3D scene and physics work.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid transform (rotation + translation) used by physics motion states
pub type Isometry = nalgebra::Isometry3<f32>;

/// Build a `translate * rotate * scale` matrix
pub fn trs_matrix(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Upper-left 3x3 block of a 4x4 matrix (rotation and scale part)
pub fn upper_left_3x3(matrix: &Mat4) -> Mat3 {
    matrix.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Translation column of an affine 4x4 matrix
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// True when all three components are exactly equal
pub fn is_uniform_scale(scale: &Vec3) -> bool {
    #[allow(clippy::float_cmp)]
    let uniform = scale.x == scale.y && scale.x == scale.z;
    uniform
}

/// Quaternion from XYZ Euler angles given in degrees.
///
/// X is applied first, then Y, then Z (`q = qz * qy * qx`).
pub fn quat_from_euler_degrees(degrees: &Vec3) -> Quat {
    Quat::from_euler_angles(
        utils::deg_to_rad(degrees.x),
        utils::deg_to_rad(degrees.y),
        utils::deg_to_rad(degrees.z),
    )
}

/// XYZ Euler angles in degrees for a quaternion (inverse of [`quat_from_euler_degrees`])
pub fn quat_to_euler_degrees(rotation: &Quat) -> Vec3 {
    let (x, y, z) = rotation.euler_angles();
    Vec3::new(utils::rad_to_deg(x), utils::rad_to_deg(y), utils::rad_to_deg(z))
}

/// Linear interpolation between two positions
pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// Extension trait for Mat4 with camera helpers
pub trait Mat4Ext {
    /// Right-handed perspective projection with OpenGL clip-space depth (-1..1)
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = -(far + near) / (far - near);
        result[(2, 3)] = -(2.0 * far * near) / (far - near);
        result[(3, 2)] = -1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trs_matrix_order() {
        // Scale first, then rotate, then translate
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), constants::HALF_PI);
        let matrix = trs_matrix(&Vec3::new(10.0, 0.0, 0.0), &rotation, &Vec3::new(2.0, 2.0, 2.0));

        let point = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point, Point3::new(10.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_euler_degrees_roundtrip() {
        let degrees = Vec3::new(30.0, -45.0, 60.0);
        let rotation = quat_from_euler_degrees(&degrees);
        assert_relative_eq!(quat_to_euler_degrees(&rotation), degrees, epsilon = 1e-3);
    }

    #[test]
    fn test_uniform_scale_detection() {
        assert!(is_uniform_scale(&Vec3::new(2.0, 2.0, 2.0)));
        assert!(!is_uniform_scale(&Vec3::new(2.0, 1.0, 2.0)));
    }

    #[test]
    fn test_lerp_vec3() {
        let a = Vec3::new(-27.2, 0.0, 2.0);
        let b = Vec3::new(-27.2, 0.0, 10.0);
        assert_relative_eq!(lerp_vec3(&a, &b, 0.5), Vec3::new(-27.2, 0.0, 6.0), epsilon = 1e-5);
        assert_relative_eq!(lerp_vec3(&a, &b, 1.0), b, epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::y());
        let transformed = view.transform_point(&Point3::from(eye));
        assert_relative_eq!(transformed, Point3::origin(), epsilon = 1e-5);
    }
}
