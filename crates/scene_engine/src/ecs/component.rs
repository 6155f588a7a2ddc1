//! Component trait and lifecycle hooks
//!
//! Every component kind can react to being attached to or detached from an
//! entity. The scene invokes these hooks uniformly, so physics registration,
//! hierarchy bookkeeping and similar side effects live with the component
//! that needs them instead of in the orchestrator.

use std::any::Any;

use crate::ecs::{Entity, World};
use crate::error::SceneError;
use crate::foundation::math::Vec3;
use crate::physics::PhysicsWorld;

/// Everything a lifecycle hook may touch while a component is attached or detached.
///
/// The component being processed is not in the world while its hook runs.
pub struct LifecycleContext<'a> {
    /// Component store
    pub world: &'a mut World,
    /// Physics world owned by the scene
    pub physics: &'a mut PhysicsWorld,
    /// Current scene gravity
    pub gravity: Vec3,
}

/// Component trait
pub trait Component: Any {
    /// Order in which this component is detached when its entity is destroyed.
    /// Lower values go first.
    const DETACH_ORDER: i32 = 0;

    /// Checked before anything on the target entity changes. A component that
    /// fails here leaves an existing component of the same type in place.
    fn validate_attach(&self) -> Result<(), SceneError> {
        Ok(())
    }

    /// Called before the component is stored on `entity`.
    /// Returning an error aborts the attach and the component is dropped.
    fn on_attach(&mut self, entity: Entity, ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError> {
        let _ = (entity, ctx);
        Ok(())
    }

    /// Called after the component has been taken out of the store for `entity`.
    fn on_detach(&mut self, entity: Entity, ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError> {
        let _ = (entity, ctx);
        Ok(())
    }
}

/// Object-safe view of a detached component, used when an entity is destroyed
/// and its components are torn down without knowing their concrete types.
pub trait DetachDyn {
    /// Run the component's detach hook
    fn detach_dyn(&mut self, entity: Entity, ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError>;

    /// Type name for logging
    fn component_name(&self) -> &'static str;
}

impl<T: Component> DetachDyn for T {
    fn detach_dyn(&mut self, entity: Entity, ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError> {
        self.on_detach(entity, ctx)
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
