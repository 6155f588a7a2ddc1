//! Rigid bodies, motion states and the per-body resource bundle

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Isometry, Quat, Vec3};

use super::shape::CollisionShape;

/// Simulation classification of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves
    Static,
    /// Moved only by explicit position writes, pushes dynamic bodies
    Kinematic,
    /// Fully simulated
    #[default]
    Dynamic,
}

bitflags! {
    /// Collision behavior flags on a rigid body
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionFlags: u32 {
        /// Immovable body with zero mass
        const STATIC_OBJECT = 1 << 0;
        /// Externally animated body with zero mass
        const KINEMATIC_OBJECT = 1 << 1;
    }
}

/// Sleep state of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivationState {
    /// Simulated, may fall asleep after resting long enough
    #[default]
    Active,
    /// Not integrated until woken
    Sleeping,
    /// Simulated every step and never falls asleep
    DisableDeactivation,
}

/// Bridge between the simulated transform and external readers/writers
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    transform: Isometry,
}

impl MotionState {
    /// Seed from a start transform
    pub fn new(transform: Isometry) -> Self {
        Self { transform }
    }

    /// Last synchronized world transform
    pub fn world_transform(&self) -> Isometry {
        self.transform
    }

    /// Overwrite the world transform
    pub fn set_world_transform(&mut self, transform: Isometry) {
        self.transform = transform;
    }
}

/// Simulated rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    mass: f32,
    inverse_mass: f32,
    flags: CollisionFlags,
    activation: ActivationState,
    resting_time: f32,
    transform: Isometry,
    linear_velocity: Vec3,
    total_force: Vec3,
    gravity: Vec3,
    user_data: u64,
}

impl RigidBody {
    /// Create a body. Static and kinematic bodies always get zero mass.
    pub fn new(body_type: BodyType, mass: f32, transform: Isometry) -> Self {
        let (mass, flags) = match body_type {
            BodyType::Static => (0.0, CollisionFlags::STATIC_OBJECT),
            BodyType::Kinematic => (0.0, CollisionFlags::KINEMATIC_OBJECT),
            BodyType::Dynamic => (mass, CollisionFlags::empty()),
        };
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };

        Self {
            mass,
            inverse_mass,
            flags,
            activation: ActivationState::Active,
            resting_time: 0.0,
            transform,
            linear_velocity: Vec3::zeros(),
            total_force: Vec3::zeros(),
            gravity: Vec3::zeros(),
            user_data: 0,
        }
    }

    /// Effective mass (zero for static and kinematic bodies)
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass (zero for immovable bodies)
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Collision flags
    pub fn collision_flags(&self) -> CollisionFlags {
        self.flags
    }

    /// True for static and kinematic bodies
    pub fn is_static_or_kinematic(&self) -> bool {
        self.flags
            .intersects(CollisionFlags::STATIC_OBJECT | CollisionFlags::KINEMATIC_OBJECT)
    }

    /// True when the body is integrated by the simulation
    pub fn is_dynamic(&self) -> bool {
        !self.is_static_or_kinematic() && self.inverse_mass > 0.0
    }

    /// Current activation state
    pub fn activation_state(&self) -> ActivationState {
        self.activation
    }

    /// Force an activation state
    pub fn set_activation_state(&mut self, state: ActivationState) {
        self.activation = state;
        self.resting_time = 0.0;
    }

    /// Wake a sleeping body. Bodies with deactivation disabled are left alone.
    pub fn activate(&mut self) {
        if self.activation == ActivationState::Sleeping {
            self.activation = ActivationState::Active;
        }
        self.resting_time = 0.0;
    }

    /// Whether the body takes part in integration this step
    pub fn is_active(&self) -> bool {
        self.activation != ActivationState::Sleeping
    }

    /// Per-body gravity acceleration
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Set per-body gravity acceleration
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Accumulate a continuous force applied at the center of mass
    pub fn apply_central_force(&mut self, force: Vec3) {
        self.total_force += force;
        self.activate();
    }

    /// Apply an instantaneous impulse at the center of mass
    pub fn apply_central_impulse(&mut self, impulse: Vec3) {
        self.linear_velocity += impulse * self.inverse_mass;
        self.activate();
    }

    /// Reset the force accumulator
    pub fn clear_forces(&mut self) {
        self.total_force = Vec3::zeros();
    }

    /// Accumulated force
    pub fn total_force(&self) -> Vec3 {
        self.total_force
    }

    /// Linear velocity
    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    /// Set linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    /// Opaque tag used to map the body back to its owner
    pub fn user_data(&self) -> u64 {
        self.user_data
    }

    /// Set the owner tag
    pub fn set_user_data(&mut self, user_data: u64) {
        self.user_data = user_data;
    }

    /// Simulated world transform
    pub fn world_transform(&self) -> Isometry {
        self.transform
    }

    /// Teleport the body
    pub fn set_world_transform(&mut self, transform: Isometry) {
        self.transform = transform;
    }

    /// Semi-implicit Euler step for a dynamic, awake body
    pub(crate) fn integrate(&mut self, dt: f32, linear_damping: f32) {
        if !self.is_dynamic() || !self.is_active() {
            return;
        }
        let acceleration = self.gravity + self.total_force * self.inverse_mass;
        self.linear_velocity += acceleration * dt;
        if linear_damping > 0.0 {
            self.linear_velocity *= (1.0 - linear_damping).clamp(0.0, 1.0).powf(dt);
        }
        self.transform.translation.vector += self.linear_velocity * dt;
    }

    /// Advance the sleep timer; returns true when the body just fell asleep
    pub(crate) fn update_deactivation(&mut self, dt: f32, threshold: f32, time_to_sleep: f32) -> bool {
        if self.activation != ActivationState::Active || !self.is_dynamic() {
            return false;
        }
        if self.linear_velocity.norm() < threshold {
            self.resting_time += dt;
        } else {
            self.resting_time = 0.0;
        }
        if self.resting_time > time_to_sleep {
            self.activation = ActivationState::Sleeping;
            self.linear_velocity = Vec3::zeros();
            return true;
        }
        false
    }
}

/// Native resource released during body teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasedResource {
    /// The motion state
    MotionState,
    /// The collision shape
    Shape,
    /// The rigid body object
    Body,
}

/// Everything one physics body owns: shape, motion state and body object.
///
/// Consumed exactly once by [`BodyResources::release`].
#[derive(Debug, Clone, PartialEq)]
pub struct BodyResources {
    /// Collision shape
    pub shape: CollisionShape,
    /// Motion state
    pub motion_state: MotionState,
    /// Rigid body
    pub body: RigidBody,
}

impl BodyResources {
    /// Build a bundle with the body and motion state seeded from `position`/`rotation`
    pub fn new(shape: CollisionShape, body_type: BodyType, mass: f32, position: Vec3, rotation: Quat) -> Self {
        let transform = Isometry::from_parts(position.into(), rotation);
        Self {
            shape,
            motion_state: MotionState::new(transform),
            body: RigidBody::new(body_type, mass, transform),
        }
    }

    /// Move body and motion state together
    pub fn teleport(&mut self, transform: Isometry) {
        self.body.set_world_transform(transform);
        self.motion_state.set_world_transform(transform);
        self.body.activate();
    }

    /// Release motion state, shape and body, in that order
    pub fn release(self) -> [ReleasedResource; 3] {
        let Self { shape, motion_state, body } = self;
        drop(motion_state);
        drop(shape);
        drop(body);
        [ReleasedResource::MotionState, ReleasedResource::Shape, ReleasedResource::Body]
    }
}
