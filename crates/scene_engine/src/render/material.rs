//! Materials: named uniforms plus texture bindings

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::uniform::{Uniform, UniformValue};
use crate::foundation::math::Mat4;

/// Material shared between renderers
pub type SharedMaterial = Rc<RefCell<Material>>;

/// Opaque handle of a texture owned by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Shader parameters and textures for one draw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    name: String,
    uniforms: HashMap<String, Uniform>,
    textures: Vec<TextureHandle>,
}

impl Material {
    /// Create an empty material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Wrap into a shared handle
    pub fn shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    /// Builder pattern: add a texture binding
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.textures.push(texture);
        self
    }

    /// Material name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a uniform by name
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    /// Look up a 4x4 matrix uniform by name
    pub fn matrix_uniform(&self, name: &str) -> Option<&Mat4> {
        self.uniform(name).and_then(Uniform::as_mat4)
    }

    /// Insert or replace a uniform
    pub fn set_uniform(&mut self, uniform: Uniform) {
        self.uniforms.insert(uniform.name().to_string(), uniform);
    }

    /// Set a 4x4 matrix value on an existing uniform; returns false if it is absent
    pub fn set_matrix(&mut self, name: &str, matrix: Mat4) -> bool {
        match self.uniforms.get_mut(name) {
            Some(uniform) => {
                uniform.set_value(UniformValue::Mat4(matrix));
                true
            }
            None => false,
        }
    }

    /// Create a matrix uniform initialized to identity unless one exists.
    /// Returns true when it was created.
    pub fn ensure_matrix_uniform(&mut self, name: &str) -> bool {
        if self.uniforms.contains_key(name) {
            return false;
        }
        self.set_uniform(Uniform::matrix(name));
        true
    }

    /// All uniforms, in no particular order
    pub fn uniforms(&self) -> impl Iterator<Item = &Uniform> {
        self.uniforms.values()
    }

    /// Texture bindings in slot order
    pub fn textures(&self) -> &[TextureHandle] {
        &self.textures
    }
}
