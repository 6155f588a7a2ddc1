//! Discrete rigid-body world
//!
//! Owns every registered body bundle in a slot arena, advances the simulation
//! on a fixed-step accumulator and keeps the contact manifolds of the last
//! sub-step for collision reporting.
//!
//! Each sub-step runs four phases:
//! 1. Integrate awake dynamic bodies (gravity, accumulated force, damping)
//! 2. Broad phase: margin-expanded AABB overlap, skipping pairs with no dynamic body
//! 3. Narrow phase: oriented-box separating-axis test with signed distances
//!    (negative = overlap)
//! 4. Resolve overlapping contacts with normal impulses and positional correction

use slotmap::SlotMap;

use crate::config::PhysicsConfig;
use crate::foundation::math::{Isometry, Vec3};

use super::body::{ActivationState, BodyResources, MotionState, ReleasedResource, RigidBody};
use super::manifold::ContactManifold;
use super::narrow_phase::box_box_contact;
use super::shape::{Aabb, OrientedBox};
use super::{BodyHandle, PhysicsError};

/// Live native resources owned through this world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceCounts {
    /// Collision shapes not yet released
    pub shapes: usize,
    /// Motion states not yet released
    pub motion_states: usize,
    /// Body objects not yet released
    pub bodies: usize,
}

/// Rigid-body simulation world
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: SlotMap<BodyHandle, BodyResources>,
    manifolds: Vec<ContactManifold>,
    local_time: f32,
    live: ResourceCounts,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            bodies: SlotMap::with_key(),
            manifolds: Vec::new(),
            local_time: 0.0,
            live: ResourceCounts::default(),
        }
    }

    /// Simulation tunables
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Register a body bundle. The world owns it until it is removed.
    pub fn add_rigid_body(&mut self, resources: BodyResources) -> BodyHandle {
        let handle = self.bodies.insert(resources);
        self.live.shapes += 1;
        self.live.motion_states += 1;
        self.live.bodies += 1;
        log::debug!("Added rigid body {:?} ({} in world)", handle, self.bodies.len());
        handle
    }

    /// Unregister a body and hand its bundle back for release
    pub fn remove_rigid_body(&mut self, handle: BodyHandle) -> Result<BodyResources, PhysicsError> {
        let resources = self.bodies.remove(handle).ok_or(PhysicsError::BodyNotInWorld)?;
        self.manifolds
            .retain(|manifold| manifold.body_a != handle && manifold.body_b != handle);
        log::debug!("Removed rigid body {:?} ({} in world)", handle, self.bodies.len());
        Ok(resources)
    }

    /// Release a bundle previously obtained from [`PhysicsWorld::remove_rigid_body`]
    pub fn release_resources(&mut self, resources: BodyResources) -> [ReleasedResource; 3] {
        let order = resources.release();
        for released in order {
            match released {
                ReleasedResource::MotionState => self.live.motion_states = self.live.motion_states.saturating_sub(1),
                ReleasedResource::Shape => self.live.shapes = self.live.shapes.saturating_sub(1),
                ReleasedResource::Body => self.live.bodies = self.live.bodies.saturating_sub(1),
            }
        }
        log::trace!("Released body resources in order {:?}", order);
        order
    }

    /// Remove and release every body; returns how many were torn down
    pub fn clear(&mut self) -> usize {
        let handles: Vec<BodyHandle> = self.bodies.keys().collect();
        let mut released = 0;
        for handle in handles {
            if let Ok(resources) = self.remove_rigid_body(handle) {
                self.release_resources(resources);
                released += 1;
            }
        }
        self.manifolds.clear();
        released
    }

    /// Whether `handle` is registered
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Number of registered bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Live resource counts
    pub fn resource_counts(&self) -> ResourceCounts {
        self.live
    }

    /// Registered handles in slot order
    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.keys()
    }

    /// Borrow a registered bundle
    pub fn resources(&self, handle: BodyHandle) -> Result<&BodyResources, PhysicsError> {
        self.bodies.get(handle).ok_or(PhysicsError::StaleHandle(handle))
    }

    /// Mutably borrow a registered bundle
    pub fn resources_mut(&mut self, handle: BodyHandle) -> Result<&mut BodyResources, PhysicsError> {
        self.bodies.get_mut(handle).ok_or(PhysicsError::StaleHandle(handle))
    }

    /// Borrow a registered body
    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.resources(handle).map(|resources| &resources.body)
    }

    /// Mutably borrow a registered body
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.resources_mut(handle).map(|resources| &mut resources.body)
    }

    /// Borrow a registered body's motion state
    pub fn motion_state(&self, handle: BodyHandle) -> Result<&MotionState, PhysicsError> {
        self.resources(handle).map(|resources| &resources.motion_state)
    }

    /// Contact manifolds of the last executed sub-step. Empty after a
    /// [`step`](Self::step) call that ran no sub-step.
    pub fn manifolds(&self) -> &[ContactManifold] {
        &self.manifolds
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Time accumulates in fixed-size sub-steps, at most `max_sub_steps` per
    /// call (leftover whole steps are dropped). With `max_sub_steps == 0` a
    /// single step of exactly `dt` runs. Forces are cleared afterwards.
    /// Returns the number of sub-steps executed.
    pub fn step(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            self.manifolds.clear();
            self.clear_forces();
            return 0;
        }

        let (sub_steps, step_dt) = if self.config.max_sub_steps == 0 {
            (1, dt)
        } else {
            let fixed = self.config.fixed_time_step;
            self.local_time += dt;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = (self.local_time / fixed).floor() as u32;
            #[allow(clippy::cast_precision_loss)]
            let consumed = whole as f32 * fixed;
            self.local_time -= consumed;
            (whole.min(self.config.max_sub_steps), fixed)
        };

        if sub_steps == 0 {
            self.manifolds.clear();
        }
        for _ in 0..sub_steps {
            self.single_step(step_dt);
        }
        self.synchronize_motion_states();
        self.clear_forces();

        log::trace!(
            "Physics step dt={dt:.5}: {sub_steps} sub-step(s), {} manifold(s)",
            self.manifolds.len()
        );
        sub_steps
    }

    fn single_step(&mut self, dt: f32) {
        let damping = self.config.linear_damping;
        for resources in self.bodies.values_mut() {
            resources.body.integrate(dt, damping);
        }

        self.manifolds = self.find_contacts();
        self.resolve_contacts();

        let threshold = self.config.sleep_linear_threshold;
        let time_to_sleep = self.config.deactivation_time;
        for (handle, resources) in &mut self.bodies {
            if resources.body.update_deactivation(dt, threshold, time_to_sleep) {
                log::trace!("Body {:?} fell asleep", handle);
            }
        }
    }

    fn find_contacts(&self) -> Vec<ContactManifold> {
        let margin = self.config.contact_margin;
        let entries: Vec<(BodyHandle, &RigidBody, OrientedBox, Aabb)> = self
            .bodies
            .iter()
            .map(|(handle, resources)| {
                let world_box = resources.shape.world_box(&resources.body.world_transform());
                (handle, &resources.body, world_box, world_box.aabb())
            })
            .collect();

        let mut manifolds = Vec::new();
        for (i, (handle_a, body_a, box_a, aabb_a)) in entries.iter().enumerate() {
            for (handle_b, body_b, box_b, aabb_b) in &entries[i + 1..] {
                if !body_a.is_dynamic() && !body_b.is_dynamic() {
                    continue;
                }
                if !aabb_a.expanded(margin).overlaps(aabb_b) {
                    continue;
                }
                if let Some(points) = box_box_contact(box_a, box_b, margin) {
                    manifolds.push(ContactManifold {
                        body_a: *handle_a,
                        body_b: *handle_b,
                        user_data_a: body_a.user_data(),
                        user_data_b: body_b.user_data(),
                        points,
                    });
                }
            }
        }
        manifolds
    }

    fn resolve_contacts(&mut self) {
        let restitution = self.config.restitution;
        let correction = self.config.position_correction;
        let slop = self.config.penetration_slop;

        for manifold in &self.manifolds {
            let Some(deepest) = manifold
                .points
                .iter()
                .filter(|point| point.is_penetrating())
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
            else {
                continue;
            };
            let Some([a, b]) = self.bodies.get_disjoint_mut([manifold.body_a, manifold.body_b]) else {
                continue;
            };

            let inv_a = a.body.inverse_mass();
            let inv_b = b.body.inverse_mass();
            let inv_sum = inv_a + inv_b;
            if inv_sum <= 0.0 {
                continue;
            }
            let normal = deepest.normal_on_b;

            let relative = a.body.linear_velocity() - b.body.linear_velocity();
            let approach = relative.dot(&normal);
            if approach < 0.0 {
                let impulse = normal * (-(1.0 + restitution) * approach / inv_sum);
                a.body.set_linear_velocity(a.body.linear_velocity() + impulse * inv_a);
                b.body.set_linear_velocity(b.body.linear_velocity() - impulse * inv_b);
            }

            let depth = (-deepest.distance - slop).max(0.0);
            if depth > 0.0 {
                let push = normal * (depth * correction / inv_sum);
                shift(&mut a.body, push * inv_a);
                shift(&mut b.body, -push * inv_b);
            }

            // A resting body hit by an awake one wakes up.
            if a.body.is_active() != b.body.is_active() {
                a.body.activate();
                b.body.activate();
            }
        }
    }

    fn synchronize_motion_states(&mut self) {
        for resources in self.bodies.values_mut() {
            if resources.body.is_dynamic() && resources.body.activation_state() != ActivationState::Sleeping {
                let transform = resources.body.world_transform();
                resources.motion_state.set_world_transform(transform);
            }
        }
    }

    fn clear_forces(&mut self) {
        for resources in self.bodies.values_mut() {
            resources.body.clear_forces();
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

fn shift(body: &mut RigidBody, offset: Vec3) {
    let mut transform: Isometry = body.world_transform();
    transform.translation.vector += offset;
    body.set_world_transform(transform);
}
