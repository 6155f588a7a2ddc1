//! Physics module for rigid-body simulation and collision reporting
//!
//! A small discrete-dynamics world with box shapes, plus the per-frame
//! collision records the scene derives from its contact manifolds.

pub mod body;
pub mod collision;
pub mod manifold;
mod narrow_phase;
pub mod shape;
pub mod world;

use thiserror::Error;

pub use body::{ActivationState, BodyResources, BodyType, CollisionFlags, MotionState, ReleasedResource, RigidBody};
pub use collision::{collect_collision_records, CollisionRecord};
pub use manifold::{ContactManifold, ContactPoint};
pub use shape::{Aabb, CollisionShape, OrientedBox};
pub use world::{PhysicsWorld, ResourceCounts};

slotmap::new_key_type! {
    /// Handle of a body registered in a [`PhysicsWorld`]
    pub struct BodyHandle;
}

/// Physics body construction, registration and teardown errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Dynamic bodies need a positive, finite mass
    #[error("Invalid mass for dynamic body: {0}")]
    InvalidMass(f32),

    /// The collision shape could not be built
    #[error("Shape creation failed: {0}")]
    ShapeCreation(String),

    /// The body is already registered with the physics world
    #[error("Body is already in the physics world")]
    AlreadyInWorld,

    /// The body is not registered with the physics world
    #[error("Body is not in the physics world")]
    BodyNotInWorld,

    /// The body's resources were released and it can no longer be used
    #[error("Body resources have been released")]
    ResourcesReleased,

    /// The handle does not refer to a registered body
    #[error("Stale body handle {0:?}")]
    StaleHandle(BodyHandle),
}
