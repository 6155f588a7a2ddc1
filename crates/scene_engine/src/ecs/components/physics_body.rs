//! Physics body component
//!
//! Wraps one rigid body and the native resources it owns. A body starts out
//! pending (resources held by the component), is registered with the scene's
//! physics world when attached, and is released when detached:
//!
//! ```text
//! Pending --attach--> Registered --detach--> Released
//! ```
//!
//! Registration and teardown happen only through the lifecycle hooks, so a
//! body can never be inserted twice or left behind in the world.

use crate::ecs::components::Transform;
use crate::ecs::{Component, Entity, LifecycleContext};
use crate::error::SceneError;
use crate::foundation::math::{quat_from_euler_degrees, quat_to_euler_degrees, Isometry, Quat, Vec3};
use crate::physics::{
    ActivationState, BodyHandle, BodyResources, BodyType, CollisionShape, PhysicsError, PhysicsWorld,
};

#[derive(Debug, Clone, PartialEq)]
enum BodyState {
    Pending(Box<BodyResources>),
    Registered(BodyHandle),
    Released,
}

/// Rigid body attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    body_type: BodyType,
    mass: f32,
    has_gravity: bool,
    in_world: bool,
    entity: Option<Entity>,
    state: BodyState,
}

impl Component for PhysicsBody {
    /// Bodies leave the physics world before any other component is removed.
    const DETACH_ORDER: i32 = -100;

    fn validate_attach(&self) -> Result<(), SceneError> {
        match self.state {
            BodyState::Pending(_) => Ok(()),
            BodyState::Registered(_) => Err(PhysicsError::AlreadyInWorld.into()),
            BodyState::Released => Err(PhysicsError::ResourcesReleased.into()),
        }
    }

    fn on_attach(&mut self, entity: Entity, ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError> {
        let mut resources = match std::mem::replace(&mut self.state, BodyState::Released) {
            BodyState::Pending(resources) => resources,
            other => {
                // Registered or released: restore and report why.
                self.state = other;
                return self.validate_attach();
            }
        };

        resources.body.set_user_data(entity.to_bits());
        resources
            .body
            .set_gravity(if self.has_gravity { ctx.gravity } else { Vec3::zeros() });
        resources
            .body
            .set_activation_state(ActivationState::DisableDeactivation);

        let handle = ctx.physics.add_rigid_body(*resources);
        self.state = BodyState::Registered(handle);
        self.entity = Some(entity);
        self.in_world = true;
        log::debug!("Physics body of {:?} registered as {:?}", entity, handle);
        Ok(())
    }

    fn on_detach(&mut self, entity: Entity, ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError> {
        let handle = match self.state {
            BodyState::Registered(handle) => handle,
            BodyState::Pending(_) => return Err(PhysicsError::BodyNotInWorld.into()),
            BodyState::Released => return Err(PhysicsError::ResourcesReleased.into()),
        };

        let resources = ctx.physics.remove_rigid_body(handle)?;
        let order = ctx.physics.release_resources(resources);
        self.state = BodyState::Released;
        self.in_world = false;
        log::debug!("Physics body of {:?} removed and released ({:?})", entity, order);
        Ok(())
    }
}

impl PhysicsBody {
    /// Build a box body.
    ///
    /// The box half-extents are half of `scale`. Static and kinematic bodies
    /// ignore `mass` and get zero; dynamic bodies need a positive finite mass.
    /// Zero scale components are accepted and give a degenerate box.
    pub fn new(
        body_type: BodyType,
        mass: f32,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> Result<Self, PhysicsError> {
        if body_type == BodyType::Dynamic && !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        let shape = CollisionShape::from_scale(scale)?;
        let resources = BodyResources::new(shape, body_type, mass, position, rotation);

        Ok(Self {
            body_type,
            mass: resources.body.mass(),
            has_gravity: true,
            in_world: false,
            entity: None,
            state: BodyState::Pending(Box::new(resources)),
        })
    }

    /// Build a box body matching a transform's local position, rotation and scale
    pub fn from_transform(transform: &Transform, body_type: BodyType, mass: f32) -> Result<Self, PhysicsError> {
        Self::new(body_type, mass, transform.position(), transform.rotation(), transform.scale())
    }

    /// Builder pattern: opt in or out of scene gravity
    pub fn with_gravity(mut self, has_gravity: bool) -> Self {
        self.has_gravity = has_gravity;
        self
    }

    /// Body classification
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Effective simulated mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Whether scene gravity applies to this body
    pub fn has_gravity(&self) -> bool {
        self.has_gravity
    }

    /// Opt in or out of scene gravity; takes effect on the next update
    pub fn set_has_gravity(&mut self, has_gravity: bool) {
        self.has_gravity = has_gravity;
    }

    /// Whether the body is registered with the physics world
    pub fn in_world(&self) -> bool {
        self.in_world
    }

    /// Owning entity, stamped on attach
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    /// Physics world handle while registered
    pub fn handle(&self) -> Option<BodyHandle> {
        match self.state {
            BodyState::Registered(handle) => Some(handle),
            _ => None,
        }
    }

    /// Collision shape
    pub fn shape(&self, physics: &PhysicsWorld) -> Result<CollisionShape, PhysicsError> {
        self.resources(physics).map(|resources| resources.shape.clone())
    }

    /// World position read through the motion state
    pub fn position(&self, physics: &PhysicsWorld) -> Result<Vec3, PhysicsError> {
        self.world_transform(physics)
            .map(|transform| transform.translation.vector)
    }

    /// Teleport the body, keeping its orientation
    pub fn set_position(&self, physics: &mut PhysicsWorld, position: Vec3) -> Result<(), PhysicsError> {
        let resources = self.resources_mut(physics)?;
        let mut transform = resources.motion_state.world_transform();
        transform.translation.vector = position;
        resources.teleport(transform);
        Ok(())
    }

    /// World orientation read through the motion state
    pub fn rotation(&self, physics: &PhysicsWorld) -> Result<Quat, PhysicsError> {
        self.world_transform(physics).map(|transform| transform.rotation)
    }

    /// Re-orient the body, keeping its position
    pub fn set_rotation(&self, physics: &mut PhysicsWorld, rotation: Quat) -> Result<(), PhysicsError> {
        let resources = self.resources_mut(physics)?;
        let mut transform = resources.motion_state.world_transform();
        transform.rotation = rotation;
        resources.teleport(transform);
        Ok(())
    }

    /// World orientation as XYZ Euler angles in degrees
    pub fn rotation_degrees(&self, physics: &PhysicsWorld) -> Result<Vec3, PhysicsError> {
        self.rotation(physics).map(|rotation| quat_to_euler_degrees(&rotation))
    }

    /// Re-orient from XYZ Euler angles in degrees
    pub fn set_rotation_degrees(&self, physics: &mut PhysicsWorld, degrees: Vec3) -> Result<(), PhysicsError> {
        self.set_rotation(physics, quat_from_euler_degrees(&degrees))
    }

    /// Accumulate a continuous force until the forces are cleared
    pub fn add_force(&self, physics: &mut PhysicsWorld, force: Vec3) -> Result<(), PhysicsError> {
        self.resources_mut(physics)?.body.apply_central_force(force);
        Ok(())
    }

    /// Apply an instantaneous impulse
    pub fn add_impulse(&self, physics: &mut PhysicsWorld, impulse: Vec3) -> Result<(), PhysicsError> {
        self.resources_mut(physics)?.body.apply_central_impulse(impulse);
        Ok(())
    }

    /// Reset the force accumulator
    pub fn clear_forces(&self, physics: &mut PhysicsWorld) -> Result<(), PhysicsError> {
        self.resources_mut(physics)?.body.clear_forces();
        Ok(())
    }

    /// Linear velocity
    pub fn linear_velocity(&self, physics: &PhysicsWorld) -> Result<Vec3, PhysicsError> {
        self.resources(physics).map(|resources| resources.body.linear_velocity())
    }

    /// Wake the body and apply the scene gravity, or none if this body opted out
    pub fn refresh(&self, physics: &mut PhysicsWorld, scene_gravity: Vec3) -> Result<(), PhysicsError> {
        let gravity = if self.has_gravity { scene_gravity } else { Vec3::zeros() };
        let body = &mut self.resources_mut(physics)?.body;
        body.activate();
        body.set_gravity(gravity);
        Ok(())
    }

    /// An unregistered copy of this body with its current simulated state
    pub fn snapshot(&self, physics: &PhysicsWorld) -> Result<Self, PhysicsError> {
        let mut resources = self.resources(physics)?.clone();
        resources.body.set_user_data(0);
        Ok(Self {
            body_type: self.body_type,
            mass: self.mass,
            has_gravity: self.has_gravity,
            in_world: false,
            entity: None,
            state: BodyState::Pending(Box::new(resources)),
        })
    }

    fn world_transform(&self, physics: &PhysicsWorld) -> Result<Isometry, PhysicsError> {
        self.resources(physics)
            .map(|resources| resources.motion_state.world_transform())
    }

    fn resources<'a>(&'a self, physics: &'a PhysicsWorld) -> Result<&'a BodyResources, PhysicsError> {
        match &self.state {
            BodyState::Pending(resources) => Ok(resources.as_ref()),
            BodyState::Registered(handle) => physics.resources(*handle),
            BodyState::Released => Err(PhysicsError::ResourcesReleased),
        }
    }

    fn resources_mut<'a>(&self, physics: &'a mut PhysicsWorld) -> Result<&'a mut BodyResources, PhysicsError> {
        match &self.state {
            BodyState::Registered(handle) => physics.resources_mut(*handle),
            BodyState::Pending(_) => Err(PhysicsError::BodyNotInWorld),
            BodyState::Released => Err(PhysicsError::ResourcesReleased),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use approx::assert_relative_eq;

    fn unit_body(body_type: BodyType, mass: f32) -> PhysicsBody {
        PhysicsBody::new(body_type, mass, Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_mass_invariant() {
        assert_eq!(unit_body(BodyType::Static, 25.0).mass(), 0.0);
        assert_eq!(unit_body(BodyType::Kinematic, 3.5).mass(), 0.0);
        assert_eq!(unit_body(BodyType::Static, f32::NAN).mass(), 0.0);
        assert_eq!(unit_body(BodyType::Dynamic, 2.0).mass(), 2.0);
    }

    #[test]
    fn test_invalid_dynamic_mass() {
        for mass in [0.0, -1.0, f32::INFINITY] {
            let result = PhysicsBody::new(BodyType::Dynamic, mass, Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
            assert!(matches!(result, Err(PhysicsError::InvalidMass(_))));
        }
    }

    #[test]
    fn test_box_half_extents_from_scale() {
        let body = PhysicsBody::new(
            BodyType::Static,
            0.0,
            Vec3::zeros(),
            Quat::identity(),
            Vec3::new(4.0, 2.0, 1.0),
        )
        .unwrap();
        let physics = PhysicsWorld::default();
        assert_eq!(body.shape(&physics).unwrap().half_extents(), Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn test_attach_detach_lifecycle() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let entity = world.spawn();
        let gravity = Vec3::new(0.0, -9.8, 0.0);
        let mut body = unit_body(BodyType::Dynamic, 1.0);

        let mut ctx = LifecycleContext { world: &mut world, physics: &mut physics, gravity };
        body.on_attach(entity, &mut ctx).unwrap();
        assert!(body.in_world());
        assert_eq!(body.entity(), Some(entity));

        let handle = body.handle().unwrap();
        let native = physics.body(handle).unwrap();
        assert_eq!(native.user_data(), entity.to_bits());
        assert_eq!(native.gravity(), gravity);
        assert_eq!(native.activation_state(), ActivationState::DisableDeactivation);

        assert!(matches!(
            body.clone().validate_attach(),
            Err(SceneError::Physics(PhysicsError::AlreadyInWorld))
        ));
        let mut ctx = LifecycleContext { world: &mut world, physics: &mut physics, gravity };
        assert!(matches!(
            body.clone().on_attach(entity, &mut ctx),
            Err(SceneError::Physics(PhysicsError::AlreadyInWorld))
        ));
        body.on_detach(entity, &mut ctx).unwrap();
        assert!(!body.in_world());
        assert_eq!(physics.body_count(), 0);
        assert_eq!(physics.resource_counts().bodies, 0);

        let mut ctx = LifecycleContext { world: &mut world, physics: &mut physics, gravity };
        assert!(matches!(
            body.on_detach(entity, &mut ctx),
            Err(SceneError::Physics(PhysicsError::ResourcesReleased))
        ));
    }

    #[test]
    fn test_gravity_opt_out() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let entity = world.spawn();
        let mut body = unit_body(BodyType::Kinematic, 0.0).with_gravity(false);

        let mut ctx = LifecycleContext {
            world: &mut world,
            physics: &mut physics,
            gravity: Vec3::new(0.0, -9.8, 0.0),
        };
        body.on_attach(entity, &mut ctx).unwrap();
        assert_eq!(physics.body(body.handle().unwrap()).unwrap().gravity(), Vec3::zeros());
    }

    #[test]
    fn test_position_and_rotation_sync() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let entity = world.spawn();
        let mut body = unit_body(BodyType::Kinematic, 0.0);
        let mut ctx = LifecycleContext { world: &mut world, physics: &mut physics, gravity: Vec3::zeros() };
        body.on_attach(entity, &mut ctx).unwrap();

        body.set_position(&mut physics, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        body.set_rotation_degrees(&mut physics, Vec3::new(0.0, 45.0, 0.0)).unwrap();

        assert_relative_eq!(body.position(&physics).unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(body.rotation_degrees(&physics).unwrap(), Vec3::new(0.0, 45.0, 0.0), epsilon = 1e-3);
        let native = physics.body(body.handle().unwrap()).unwrap().world_transform();
        assert_relative_eq!(native.translation.vector, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_pending_body_cannot_be_driven() {
        let mut physics = PhysicsWorld::default();
        let body = unit_body(BodyType::Dynamic, 1.0);

        assert_eq!(body.position(&physics).unwrap(), Vec3::zeros());
        assert_eq!(
            body.add_impulse(&mut physics, Vec3::new(0.0, 1.0, 0.0)),
            Err(PhysicsError::BodyNotInWorld)
        );
    }
}
