//! Named shader parameters

use crate::foundation::math::{Mat3, Mat4, Vec3};

/// Value carried by a uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// 4x4 matrix (column-major)
    Mat4(Mat4),
    /// 3x3 matrix (column-major)
    Mat3(Mat3),
    /// 3-component vector
    Vec3(Vec3),
    /// Scalar
    Float(f32),
    /// Integer, typically a sampler slot
    Int(i32),
}

/// Named shader parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    name: String,
    value: UniformValue,
}

impl Uniform {
    /// Create a uniform
    pub fn new(name: impl Into<String>, value: UniformValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Matrix uniform initialized to identity
    pub fn matrix(name: impl Into<String>) -> Self {
        Self::new(name, UniformValue::Mat4(Mat4::identity()))
    }

    /// Uniform name as referenced by the shader
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    pub fn value(&self) -> &UniformValue {
        &self.value
    }

    /// Replace the value
    pub fn set_value(&mut self, value: UniformValue) {
        self.value = value;
    }

    /// Matrix value, if this is a 4x4 matrix uniform
    pub fn as_mat4(&self) -> Option<&Mat4> {
        match &self.value {
            UniformValue::Mat4(matrix) => Some(matrix),
            _ => None,
        }
    }

    /// Raw bytes for upload, in column-major order for matrices
    pub fn as_bytes(&self) -> &[u8] {
        match &self.value {
            UniformValue::Mat4(matrix) => bytemuck::cast_slice(matrix.as_slice()),
            UniformValue::Mat3(matrix) => bytemuck::cast_slice(matrix.as_slice()),
            UniformValue::Vec3(vector) => bytemuck::cast_slice(vector.as_slice()),
            UniformValue::Float(value) => bytemuck::bytes_of(value),
            UniformValue::Int(value) => bytemuck::bytes_of(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_sizes() {
        assert_eq!(Uniform::matrix("Model").as_bytes().len(), 64);
        assert_eq!(Uniform::new("Normal", UniformValue::Mat3(Mat3::identity())).as_bytes().len(), 36);
        assert_eq!(Uniform::new("Light", UniformValue::Vec3(Vec3::zeros())).as_bytes().len(), 12);
        assert_eq!(Uniform::new("Alpha", UniformValue::Float(0.5)).as_bytes(), 0.5f32.to_ne_bytes().as_slice());
    }

    #[test]
    fn test_matrix_bytes_are_column_major() {
        let mut matrix = Mat4::identity();
        matrix[(0, 3)] = 7.0;
        let uniform = Uniform::new("Model", UniformValue::Mat4(matrix));
        let floats: &[f32] = bytemuck::cast_slice(uniform.as_bytes());

        assert_eq!(floats[12], 7.0);
    }
}
