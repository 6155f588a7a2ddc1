//! Render collaborators
//!
//! Materials, uniforms, cameras and the backend seam the scene renders
//! through. No graphics API lives here.

pub mod backend;
pub mod camera;
pub mod material;
pub mod uniform;

use thiserror::Error;

pub use backend::{LoggingBackend, MeshHandle, RenderBackend};
pub use camera::{Camera, ViewProjection};
pub use material::{Material, SharedMaterial, TextureHandle};
pub use uniform::{Uniform, UniformValue};

/// Name of the model matrix uniform
pub const MODEL_UNIFORM: &str = "Model";

/// Name of the model-view-projection matrix uniform
pub const MVP_UNIFORM: &str = "MVP";

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The backend rejected an operation
    #[error("Rendering backend failed: {0}")]
    Backend(String),

    /// The material is mutably borrowed elsewhere
    #[error("Material is already borrowed")]
    MaterialBusy,
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
