//! Renderer component
//!
//! Pairs a shared material with a mesh handle. The scene refreshes the
//! material's model and MVP matrices before asking the renderer to draw.

use crate::ecs::Component;
use crate::render::{MeshHandle, RenderBackend, RenderError, SharedMaterial};

/// Draws one mesh with one material
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    /// Material used for the draw
    pub material: Option<SharedMaterial>,
    /// Vertex data to draw
    pub mesh: Option<MeshHandle>,
}

impl Component for Renderer {}

impl Renderer {
    /// Create a renderer for `mesh` drawn with `material`
    pub fn new(material: SharedMaterial, mesh: MeshHandle) -> Self {
        Self {
            material: Some(material),
            mesh: Some(mesh),
        }
    }

    /// Bind, draw and unbind. Does nothing unless both material and mesh are set.
    /// Returns whether a draw was issued.
    pub fn render(&self, backend: &mut dyn RenderBackend) -> Result<bool, RenderError> {
        let (Some(material), Some(mesh)) = (&self.material, self.mesh) else {
            return Ok(false);
        };
        let material = material
            .try_borrow()
            .map_err(|_| RenderError::MaterialBusy)?;

        backend.bind(&material)?;
        let drawn = backend.draw(mesh);
        // Unbind even when the draw failed so the backend is left clean.
        backend.unbind(&material)?;
        drawn.map(|()| true)
    }
}
