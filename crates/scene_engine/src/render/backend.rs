//! Rendering backend seam
//!
//! The scene never talks to a graphics API directly. A backend binds a
//! material's uniforms and textures, draws a mesh and unbinds again.

use super::material::Material;
use super::RenderError;

/// Backend operation result
pub type BackendResult<T> = Result<T, RenderError>;

/// Opaque handle of vertex data owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Minimal drawing interface a renderer component drives
pub trait RenderBackend {
    /// Bind shader state, uniforms and textures of `material`
    fn bind(&mut self, material: &Material) -> BackendResult<()>;

    /// Issue the draw call for `mesh`
    fn draw(&mut self, mesh: MeshHandle) -> BackendResult<()>;

    /// Release the bindings made by [`RenderBackend::bind`]
    fn unbind(&mut self, material: &Material) -> BackendResult<()>;
}

/// Backend that only logs what it is asked to do
#[derive(Debug, Default)]
pub struct LoggingBackend {
    draw_calls: usize,
}

impl LoggingBackend {
    /// Create a new logging backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls issued so far
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }
}

impl RenderBackend for LoggingBackend {
    fn bind(&mut self, material: &Material) -> BackendResult<()> {
        log::trace!("bind material '{}'", material.name());
        Ok(())
    }

    fn draw(&mut self, mesh: MeshHandle) -> BackendResult<()> {
        self.draw_calls += 1;
        log::trace!("draw {:?}", mesh);
        Ok(())
    }

    fn unbind(&mut self, material: &Material) -> BackendResult<()> {
        log::trace!("unbind material '{}'", material.name());
        Ok(())
    }
}
