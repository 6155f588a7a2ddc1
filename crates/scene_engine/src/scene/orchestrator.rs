//! Scene orchestration
//!
//! The scene owns the component store, the physics world and the collision
//! records of the current frame. Every physics registration goes through the
//! component lifecycle hooks it runs, so the store and the physics world agree
//! on which bodies are live.
//!
//! Per frame:
//! - `update`: step physics, refresh each body (wake + gravity), rebuild the
//!   collision records, copy simulated positions into transforms
//! - `render`: forward kinematics, refresh "Model"/"MVP" uniforms, draw

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::SceneConfig;
use crate::ecs::components::{PhysicsBody, Renderer, Transform};
use crate::ecs::systems::transform_hierarchy;
use crate::ecs::{Component, Entity, LifecycleContext, World};
use crate::error::{EntityFailure, SceneError};
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::physics::{collect_collision_records, CollisionRecord, PhysicsWorld};
use crate::render::{RenderBackend, RenderError, ViewProjection, MODEL_UNIFORM, MVP_UNIFORM};

/// Camera shared with the scene; the scene only keeps a weak reference
pub type SharedCamera = Rc<RefCell<dyn ViewProjection>>;

/// Outcome of one [`Scene::update`]
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// True when the scene was inactive or paused and nothing ran
    pub skipped: bool,
    /// Physics sub-steps executed
    pub sub_steps: u32,
    /// Transforms overwritten from simulated positions
    pub transforms_synced: usize,
    /// Collision records built this frame
    pub collisions: usize,
    /// Entities whose processing failed; the rest of the pass still ran
    pub failures: Vec<EntityFailure>,
}

/// Outcome of one [`Scene::render`]
#[derive(Debug, Default)]
pub struct RenderReport {
    /// True when the scene was inactive and nothing ran
    pub skipped: bool,
    /// Renderers that issued a draw
    pub drawn: usize,
    /// Entities whose rendering failed; the rest of the pass still ran
    pub failures: Vec<EntityFailure>,
}

/// Entity store, physics world and per-frame pipeline
pub struct Scene {
    world: World,
    physics: PhysicsWorld,
    gravity: Vec3,
    active: bool,
    paused: bool,
    camera: Option<Weak<RefCell<dyn ViewProjection>>>,
    collisions: Vec<CollisionRecord>,
}

impl Scene {
    /// Create a scene from a validated configuration
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        log::info!(
            "Creating scene: gravity {:?}, fixed step {:.4}s, {} max sub-step(s)",
            config.gravity,
            config.physics.fixed_time_step,
            config.physics.max_sub_steps
        );
        Ok(Self {
            world: World::new(),
            physics: PhysicsWorld::new(config.physics),
            gravity: config.gravity,
            active: true,
            paused: config.start_paused,
            camera: None,
            collisions: Vec::new(),
        })
    }

    /// Read access to the component store
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read access to the physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    fn context(&mut self) -> LifecycleContext<'_> {
        LifecycleContext {
            world: &mut self.world,
            physics: &mut self.physics,
            gravity: self.gravity,
        }
    }

    // --- Entities -------------------------------------------------------

    /// Create an entity with no components
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.world.spawn();
        log::debug!("Created entity {:?}", entity);
        entity
    }

    /// Destroy an entity and all of its components.
    ///
    /// Components are detached in ascending detach order, so a physics body
    /// leaves the physics world before anything else goes. Every component is
    /// detached even if one hook fails; the first failure is returned.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), SceneError> {
        self.world.ensure_alive(entity)?;

        let mut first_error = None;
        for (_, mut component) in self.world.take_all(entity) {
            let name = component.component_name();
            if let Err(error) = component.detach_dyn(entity, &mut self.context()) {
                log::warn!("Detaching {} from {:?} failed: {}", name, entity, error);
                first_error.get_or_insert(error);
            }
        }
        self.world.despawn(entity)?;
        log::debug!("Destroyed entity {:?}", entity);

        first_error.map_or(Ok(()), Err)
    }

    /// Whether `entity` is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.is_alive(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.world.entity_count()
    }

    // --- Components -----------------------------------------------------

    /// Attach a component, running its attach hook.
    ///
    /// The component is validated first; a rejected component leaves the
    /// entity untouched. Otherwise an existing component of the same type is
    /// detached before the new one's attach hook runs.
    pub fn attach<T: Component>(&mut self, entity: Entity, mut component: T) -> Result<(), SceneError> {
        self.world.ensure_alive(entity)?;
        component.validate_attach()?;
        if self.world.has::<T>(entity) {
            self.remove::<T>(entity)?;
        }
        component.on_attach(entity, &mut self.context())?;
        self.world.insert(entity, component)?;
        Ok(())
    }

    /// Attach a copy of `component`
    pub fn attach_copy<T: Component + Clone>(&mut self, entity: Entity, component: &T) -> Result<(), SceneError> {
        self.attach(entity, component.clone())
    }

    /// Attach a default-constructed component
    pub fn attach_default<T: Component + Default>(&mut self, entity: Entity) -> Result<(), SceneError> {
        self.attach(entity, T::default())
    }

    /// Detach and return a component, running its detach hook
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<T, SceneError> {
        let mut component = self.world.take::<T>(entity)?;
        component.on_detach(entity, &mut self.context())?;
        Ok(component)
    }

    /// Borrow a component
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, SceneError> {
        Ok(self.world.get::<T>(entity)?)
    }

    /// Mutably borrow a component
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, SceneError> {
        Ok(self.world.get_mut::<T>(entity)?)
    }

    /// Whether `entity` has a `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.world.has::<T>(entity)
    }

    // --- Hierarchy ------------------------------------------------------

    /// Reparent `child` under `parent` (or make it a root)
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), SceneError> {
        Ok(transform_hierarchy::set_parent(&mut self.world, child, parent)?)
    }

    /// Fresh global matrix of one node, walking up its parents
    pub fn recompute_global(&mut self, entity: Entity) -> Result<Mat4, SceneError> {
        Ok(transform_hierarchy::recompute_global(&mut self.world, entity)?)
    }

    /// Refresh the subtree rooted at `root`; returns the number of nodes visited
    pub fn forward_kinematics(&mut self, root: Entity) -> Result<usize, SceneError> {
        Ok(transform_hierarchy::forward_kinematics(&mut self.world, root)?)
    }

    // --- Scene state ----------------------------------------------------

    /// Scene gravity
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Change scene gravity. Bodies pick it up on the next update.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        log::info!("Scene gravity set to {:?}", gravity);
        self.gravity = gravity;
    }

    /// Whether update and render run at all
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enable or disable the whole scene
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            log::info!("Scene {}", if active { "activated" } else { "deactivated" });
        }
        self.active = active;
    }

    /// Whether the simulation is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume the simulation; rendering continues while paused
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::info!("Scene {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Use `camera` for MVP matrices. The scene does not keep it alive.
    pub fn set_camera(&mut self, camera: &SharedCamera) {
        self.camera = Some(Rc::downgrade(camera));
    }

    /// Stop refreshing MVP matrices
    pub fn clear_camera(&mut self) {
        self.camera = None;
    }

    /// Whether a live camera is set
    pub fn has_camera(&self) -> bool {
        self.camera.as_ref().is_some_and(|camera| camera.strong_count() > 0)
    }

    // --- Collisions -----------------------------------------------------

    /// Collision records of the last update
    pub fn collisions(&self) -> &[CollisionRecord] {
        &self.collisions
    }

    /// Collision records of the last update that involve `entity`
    pub fn collisions_involving(&self, entity: Entity) -> impl Iterator<Item = &CollisionRecord> {
        self.collisions.iter().filter(move |record| record.involves(entity))
    }

    // --- Physics body access ----------------------------------------------

    /// Simulated world position of an entity's body
    pub fn body_position(&self, entity: Entity) -> Result<Vec3, SceneError> {
        Ok(self.world.get::<PhysicsBody>(entity)?.position(&self.physics)?)
    }

    /// Teleport an entity's body
    pub fn set_body_position(&mut self, entity: Entity, position: Vec3) -> Result<(), SceneError> {
        let body = self.world.get::<PhysicsBody>(entity)?;
        Ok(body.set_position(&mut self.physics, position)?)
    }

    /// Simulated world orientation of an entity's body
    pub fn body_rotation(&self, entity: Entity) -> Result<Quat, SceneError> {
        Ok(self.world.get::<PhysicsBody>(entity)?.rotation(&self.physics)?)
    }

    /// Re-orient an entity's body
    pub fn set_body_rotation(&mut self, entity: Entity, rotation: Quat) -> Result<(), SceneError> {
        let body = self.world.get::<PhysicsBody>(entity)?;
        Ok(body.set_rotation(&mut self.physics, rotation)?)
    }

    /// Accumulate a force on an entity's body until the next step
    pub fn add_force(&mut self, entity: Entity, force: Vec3) -> Result<(), SceneError> {
        let body = self.world.get::<PhysicsBody>(entity)?;
        Ok(body.add_force(&mut self.physics, force)?)
    }

    /// Apply an impulse to an entity's body
    pub fn add_impulse(&mut self, entity: Entity, impulse: Vec3) -> Result<(), SceneError> {
        let body = self.world.get::<PhysicsBody>(entity)?;
        Ok(body.add_impulse(&mut self.physics, impulse)?)
    }

    /// Reset the force accumulator of an entity's body
    pub fn clear_forces(&mut self, entity: Entity) -> Result<(), SceneError> {
        let body = self.world.get::<PhysicsBody>(entity)?;
        Ok(body.clear_forces(&mut self.physics)?)
    }

    /// Unregistered copy of an entity's body, ready to attach elsewhere
    pub fn snapshot_body(&self, entity: Entity) -> Result<PhysicsBody, SceneError> {
        Ok(self.world.get::<PhysicsBody>(entity)?.snapshot(&self.physics)?)
    }

    // --- Frame pipeline -------------------------------------------------

    /// Advance the simulation by `dt` seconds.
    ///
    /// Skipped entirely while the scene is inactive or paused.
    pub fn update(&mut self, dt: f32) -> UpdateReport {
        if !self.active || self.paused {
            return UpdateReport {
                skipped: true,
                ..UpdateReport::default()
            };
        }

        let mut report = UpdateReport {
            sub_steps: self.physics.step(dt),
            ..UpdateReport::default()
        };

        let bodies = self.world.entities_with::<PhysicsBody>();
        for &entity in &bodies {
            let refreshed = self
                .world
                .get::<PhysicsBody>(entity)
                .map_err(SceneError::from)
                .and_then(|body| Ok(body.refresh(&mut self.physics, self.gravity)?));
            if let Err(error) = refreshed {
                report.failures.push(EntityFailure::new(entity, error));
            }
        }

        collect_collision_records(self.physics.manifolds(), &mut self.collisions);
        let world = &self.world;
        self.collisions.retain(|record| {
            let live = world.is_alive(record.entity_a) && world.is_alive(record.entity_b);
            if !live {
                log::warn!("Dropping collision record with a dead entity: {:?}", record);
            }
            live
        });
        report.collisions = self.collisions.len();
        log::trace!("{} collision record(s) this frame", report.collisions);

        for &entity in &bodies {
            if !self.world.has::<Transform>(entity) {
                continue;
            }
            let position = match self.body_position(entity) {
                Ok(position) => position,
                Err(error) => {
                    report.failures.push(EntityFailure::new(entity, error));
                    continue;
                }
            };
            if let Some(transform) = self.world.try_get_mut::<Transform>(entity) {
                transform.set_position(position);
                report.transforms_synced += 1;
            }
        }

        log_failures("update", &report.failures);
        report
    }

    /// Draw every entity that has both a renderer and a transform.
    ///
    /// Runs while paused (a frozen frame); skipped while inactive.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> RenderReport {
        if !self.active {
            return RenderReport {
                skipped: true,
                ..RenderReport::default()
            };
        }

        transform_hierarchy::forward_kinematics_all(&mut self.world);
        let view_projection = self.view_projection();

        let mut report = RenderReport::default();
        for entity in self.world.entities_with::<Renderer>() {
            match self.render_entity(entity, view_projection, backend) {
                Ok(true) => report.drawn += 1,
                Ok(false) => {}
                Err(error) => report.failures.push(EntityFailure::new(entity, error)),
            }
        }

        log_failures("render", &report.failures);
        report
    }

    fn view_projection(&self) -> Option<Mat4> {
        let camera = self.camera.as_ref()?.upgrade()?;
        let camera = camera.try_borrow().ok()?;
        Some(camera.view_projection())
    }

    fn render_entity(
        &self,
        entity: Entity,
        view_projection: Option<Mat4>,
        backend: &mut dyn RenderBackend,
    ) -> Result<bool, SceneError> {
        let Some(transform) = self.world.try_get::<Transform>(entity) else {
            return Ok(false);
        };
        let renderer = self.world.get::<Renderer>(entity)?;
        let model = transform.global();

        if let Some(material) = &renderer.material {
            let mut material = material
                .try_borrow_mut()
                .map_err(|_| RenderError::MaterialBusy)?;
            material.ensure_matrix_uniform(MODEL_UNIFORM);
            material.ensure_matrix_uniform(MVP_UNIFORM);
            material.set_matrix(MODEL_UNIFORM, model);
            if let Some(view_projection) = view_projection {
                material.set_matrix(MVP_UNIFORM, view_projection * model);
            }
        }

        Ok(renderer.render(backend)?)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            world: World::new(),
            physics: PhysicsWorld::default(),
            gravity: Vec3::zeros(),
            active: true,
            paused: false,
            camera: None,
            collisions: Vec::new(),
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        let released = self.physics.clear();
        if released > 0 {
            log::debug!("Scene dropped: released {} physics bod(ies)", released);
        }
    }
}

fn log_failures(pass: &str, failures: &[EntityFailure]) {
    for failure in failures {
        log::warn!("{} failed for {:?}: {}", pass, failure.entity, failure.error);
    }
}
