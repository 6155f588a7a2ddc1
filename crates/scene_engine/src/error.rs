//! Scene-level error type
//!
//! Each subsystem owns its own error enum; `SceneError` is what scene
//! operations return so callers deal with a single type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ecs::{EcsError, Entity};
use crate::ecs::systems::HierarchyError;
use crate::physics::PhysicsError;
use crate::render::RenderError;

/// Errors raised by scene operations
#[derive(Error, Debug)]
pub enum SceneError {
    /// Entity or component store misuse
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Physics body construction, registration or teardown failure
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Transform hierarchy violation
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    /// Render collaborator failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A failure isolated to one entity during a frame-wide pass
#[derive(Debug)]
pub struct EntityFailure {
    /// Entity whose processing failed
    pub entity: Entity,
    /// What went wrong
    pub error: SceneError,
}

impl EntityFailure {
    /// Create a new failure record
    pub fn new(entity: Entity, error: impl Into<SceneError>) -> Self {
        Self { entity, error: error.into() }
    }
}
