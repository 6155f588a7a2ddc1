//! # Scene Engine
//!
//! A small real-time 3D scene runtime: an entity-component store with
//! generational handles, a rigid-body physics world, a transform hierarchy
//! and per-frame collision records, kept consistent by one orchestrating
//! [`Scene`](scene::Scene).
//!
//! ## Features
//!
//! - **ECS**: generational entities, per-type storage, attach/detach lifecycle hooks
//! - **Physics**: box bodies (static, kinematic, dynamic), fixed-step simulation
//! - **Hierarchy**: parent/child transforms with a single-pass forward-kinematics walk
//! - **Collisions**: unordered, deduplicated entity pairs rebuilt every frame
//! - **Rendering seam**: lazily created "Model"/"MVP" uniforms fed to a pluggable backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let config = SceneConfig::default().with_gravity(Vec3::new(0.0, -9.8, 0.0));
//!     let mut scene = Scene::new(config)?;
//!
//!     let crate_box = scene.create_entity();
//!     let transform = Transform::from_position(Vec3::new(0.0, 10.0, 0.0));
//!     let body = PhysicsBody::from_transform(&transform, BodyType::Dynamic, 1.0)?;
//!     scene.attach(crate_box, transform)?;
//!     scene.attach(crate_box, body)?;
//!
//!     let mut backend = LoggingBackend::new();
//!     for _ in 0..60 {
//!         scene.update(1.0 / 60.0);
//!         scene.render(&mut backend);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod foundation;
pub mod physics;
pub mod render;
pub mod scene;

pub use error::{EntityFailure, SceneError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, PhysicsConfig, SceneConfig},
        ecs::{
            components::{PhysicsBody, Renderer, Transform},
            Component, Entity, LifecycleContext, World,
        },
        error::{EntityFailure, SceneError},
        foundation::math::{Mat3, Mat4, Quat, Vec3},
        physics::{BodyType, CollisionRecord, PhysicsError},
        render::{
            Camera, LoggingBackend, Material, MeshHandle, RenderBackend, SharedMaterial, ViewProjection,
        },
        scene::{FrameReport, RenderReport, Scene, SceneRunner, SceneScript, SharedCamera, UpdateReport},
    };
}
