//! End-to-end behavior of the scene pipeline: physics lifecycle, collision
//! records, transform sync, pause handling and the render pass.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use scene_engine::prelude::*;
use scene_engine::render::backend::BackendResult;
use scene_engine::render::{MODEL_UNIFORM, MVP_UNIFORM};

const DT: f32 = 1.0 / 60.0;

fn earth_scene() -> Scene {
    Scene::new(SceneConfig::default().with_gravity(Vec3::new(0.0, -9.8, 0.0))).unwrap()
}

fn spawn_box(scene: &mut Scene, position: Vec3, body_type: BodyType) -> Entity {
    let entity = scene.create_entity();
    let transform = Transform::from_position(position);
    let body = PhysicsBody::from_transform(&transform, body_type, 1.0).unwrap();
    scene.attach(entity, transform).unwrap();
    scene.attach(entity, body).unwrap();
    entity
}

#[derive(Default)]
struct RecordingBackend {
    draws: Vec<MeshHandle>,
    bound: Vec<String>,
}

impl RenderBackend for RecordingBackend {
    fn bind(&mut self, material: &Material) -> BackendResult<()> {
        self.bound.push(material.name().to_string());
        Ok(())
    }

    fn draw(&mut self, mesh: MeshHandle) -> BackendResult<()> {
        self.draws.push(mesh);
        Ok(())
    }

    fn unbind(&mut self, _material: &Material) -> BackendResult<()> {
        Ok(())
    }
}

struct FixedCamera(Mat4);

impl ViewProjection for FixedCamera {
    fn view_projection(&self) -> Mat4 {
        self.0
    }
}

#[test]
fn falling_boxes_produce_one_record_on_first_contact() {
    let mut scene = earth_scene();
    let lower = spawn_box(&mut scene, Vec3::new(0.0, 0.0, 0.0), BodyType::Dynamic);
    let upper = spawn_box(&mut scene, Vec3::new(0.0, 10.0, 0.0), BodyType::Dynamic);
    scene.add_impulse(upper, Vec3::new(0.0, -10.0, 0.0)).unwrap();

    let mut first_contact = None;
    for step in 0..600 {
        let report = scene.update(DT);
        assert!(report.failures.is_empty());
        if !scene.collisions().is_empty() {
            first_contact = Some(step);
            break;
        }
        assert_eq!(report.collisions, 0);
    }

    let step = first_contact.expect("boxes never collided");
    assert!(step > 0);
    assert_eq!(scene.collisions(), &[CollisionRecord::new(upper, lower)]);
    assert_eq!(scene.collisions_involving(lower).count(), 1);
}

#[test]
fn records_are_rebuilt_every_frame() {
    let mut scene = Scene::default();
    let floor = spawn_box(&mut scene, Vec3::zeros(), BodyType::Static);
    let resting = spawn_box(&mut scene, Vec3::new(0.0, 0.9, 0.0), BodyType::Dynamic);

    scene.update(DT);
    assert_eq!(scene.collisions(), &[CollisionRecord::new(floor, resting)]);

    scene.set_body_position(resting, Vec3::new(0.0, 50.0, 0.0)).unwrap();
    scene.update(DT);
    assert!(scene.collisions().is_empty());
}

#[test]
fn transforms_follow_simulated_positions() {
    let mut scene = earth_scene();
    let falling = spawn_box(&mut scene, Vec3::new(0.0, 10.0, 0.0), BodyType::Dynamic);

    for _ in 0..10 {
        scene.update(DT);
    }

    let body_position = scene.body_position(falling).unwrap();
    let transform_position = scene.get::<Transform>(falling).unwrap().position();
    assert!(body_position.y < 10.0);
    assert_relative_eq!(transform_position, body_position);
}

#[test]
fn gravity_opt_out_keeps_body_still() {
    let mut scene = earth_scene();
    let entity = scene.create_entity();
    let transform = Transform::from_position(Vec3::new(3.0, 4.0, 0.0));
    let body = PhysicsBody::from_transform(&transform, BodyType::Dynamic, 2.0)
        .unwrap()
        .with_gravity(false);
    scene.attach(entity, transform).unwrap();
    scene.attach(entity, body).unwrap();

    for _ in 0..30 {
        scene.update(DT);
    }
    assert_relative_eq!(scene.body_position(entity).unwrap(), Vec3::new(3.0, 4.0, 0.0));

    scene.get_mut::<PhysicsBody>(entity).unwrap().set_has_gravity(true);
    scene.update(DT);
    scene.update(DT);
    assert!(scene.body_position(entity).unwrap().y < 4.0);
}

#[test]
fn paused_scene_freezes_positions_but_renders() {
    let mut scene = earth_scene();
    let falling = spawn_box(&mut scene, Vec3::new(0.0, 10.0, 0.0), BodyType::Dynamic);
    scene
        .attach(falling, Renderer::new(Material::new("crate").shared(), MeshHandle(1)))
        .unwrap();
    scene.update(DT);

    scene.set_paused(true);
    let body_before = scene.body_position(falling).unwrap();
    let transform_before = scene.get::<Transform>(falling).unwrap().position();

    for _ in 0..20 {
        assert!(scene.update(DT).skipped);
    }
    let mut backend = RecordingBackend::default();
    let render = scene.render(&mut backend);

    assert!(!render.skipped);
    assert!(render.failures.is_empty());
    assert_eq!(render.drawn, 1);
    assert_eq!(scene.body_position(falling).unwrap(), body_before);
    assert_eq!(scene.get::<Transform>(falling).unwrap().position(), transform_before);

    scene.set_paused(false);
    assert!(!scene.update(DT).skipped);
    assert!(scene.body_position(falling).unwrap().y < body_before.y);
}

#[test]
fn inactive_scene_skips_update_and_render() {
    let mut scene = earth_scene();
    let falling = spawn_box(&mut scene, Vec3::new(0.0, 10.0, 0.0), BodyType::Dynamic);
    scene.set_active(false);

    assert!(scene.update(DT).skipped);
    assert!(scene.render(&mut RecordingBackend::default()).skipped);
    assert_eq!(scene.body_position(falling).unwrap(), Vec3::new(0.0, 10.0, 0.0));
}

#[test]
fn attach_then_detach_leaves_no_trace() {
    let mut scene = earth_scene();
    spawn_box(&mut scene, Vec3::new(0.0, -5.0, 0.0), BodyType::Static);
    let bodies_before = scene.physics().body_count();
    let resources_before = scene.physics().resource_counts();

    let entity = scene.create_entity();
    let body = PhysicsBody::new(
        BodyType::Dynamic,
        1.0,
        Vec3::zeros(),
        Quat::identity(),
        Vec3::new(1.0, 1.0, 1.0),
    )
    .unwrap();
    scene.attach(entity, body).unwrap();
    assert_eq!(scene.physics().body_count(), bodies_before + 1);
    assert!(scene.get::<PhysicsBody>(entity).unwrap().in_world());

    let removed = scene.remove::<PhysicsBody>(entity).unwrap();
    assert!(!removed.in_world());
    assert_eq!(scene.physics().body_count(), bodies_before);
    assert_eq!(scene.physics().resource_counts(), resources_before);
    assert!(!scene.has::<PhysicsBody>(entity));
}

#[test]
fn destroying_an_entity_tears_down_body_and_hierarchy() {
    let mut scene = earth_scene();
    let parent = spawn_box(&mut scene, Vec3::new(0.0, 2.0, 0.0), BodyType::Kinematic);
    let child = scene.create_entity();
    scene.attach(child, Transform::from_position(Vec3::new(1.0, 0.0, 0.0))).unwrap();
    scene.set_parent(child, Some(parent)).unwrap();
    let resources_before = scene.physics().resource_counts();

    scene.destroy_entity(parent).unwrap();

    assert!(!scene.is_alive(parent));
    assert_eq!(scene.physics().body_count(), 0);
    assert_eq!(scene.physics().resource_counts().bodies, resources_before.bodies - 1);
    assert_eq!(scene.get::<Transform>(child).unwrap().parent(), None);
    assert!(matches!(
        scene.get::<Transform>(parent),
        Err(SceneError::Ecs(_))
    ));
    assert!(scene.destroy_entity(parent).is_err());
}

#[test]
fn stale_handles_never_alias_new_entities() {
    let mut scene = earth_scene();
    let old = spawn_box(&mut scene, Vec3::zeros(), BodyType::Dynamic);
    scene.destroy_entity(old).unwrap();
    let new = spawn_box(&mut scene, Vec3::zeros(), BodyType::Dynamic);

    assert_ne!(old, new);
    assert!(scene.get::<PhysicsBody>(old).is_err());
    assert!(scene.body_position(old).is_err());
    assert!(scene.get::<PhysicsBody>(new).is_ok());
}

#[test]
fn registered_body_cannot_be_attached_twice() {
    let mut scene = earth_scene();
    let first = spawn_box(&mut scene, Vec3::zeros(), BodyType::Dynamic);
    let second = scene.create_entity();

    let live_copy = scene.get::<PhysicsBody>(first).unwrap().clone();
    let result = scene.attach(second, live_copy);
    assert!(matches!(
        result,
        Err(SceneError::Physics(PhysicsError::AlreadyInWorld))
    ));
    assert!(!scene.has::<PhysicsBody>(second));
    assert_eq!(scene.physics().body_count(), 1);

    let snapshot = scene.snapshot_body(first).unwrap();
    scene.attach(second, snapshot).unwrap();
    assert_eq!(scene.physics().body_count(), 2);
    assert_eq!(scene.body_position(second).unwrap(), scene.body_position(first).unwrap());
}

#[test]
fn rejected_body_keeps_the_existing_one() {
    let mut scene = earth_scene();
    let first = spawn_box(&mut scene, Vec3::zeros(), BodyType::Dynamic);
    let second = spawn_box(&mut scene, Vec3::new(0.0, 5.0, 0.0), BodyType::Dynamic);
    let resources_before = scene.physics().resource_counts();

    let live_copy = scene.get::<PhysicsBody>(first).unwrap().clone();
    assert!(matches!(
        scene.attach(second, live_copy),
        Err(SceneError::Physics(PhysicsError::AlreadyInWorld))
    ));

    let third = spawn_box(&mut scene, Vec3::new(0.0, 10.0, 0.0), BodyType::Dynamic);
    let released = scene.remove::<PhysicsBody>(third).unwrap();
    assert!(matches!(
        scene.attach(second, released),
        Err(SceneError::Physics(PhysicsError::ResourcesReleased))
    ));

    let kept = scene.get::<PhysicsBody>(second).unwrap();
    assert!(kept.in_world());
    assert_eq!(kept.entity(), Some(second));
    assert_eq!(scene.physics().body_count(), 2);
    assert_eq!(scene.physics().resource_counts(), resources_before);
    assert_eq!(scene.body_position(second).unwrap(), Vec3::new(0.0, 5.0, 0.0));
}

#[test]
fn reattaching_replaces_the_previous_body() {
    let mut scene = earth_scene();
    let entity = spawn_box(&mut scene, Vec3::zeros(), BodyType::Dynamic);

    let replacement = PhysicsBody::new(
        BodyType::Static,
        9.0,
        Vec3::new(0.0, -1.0, 0.0),
        Quat::identity(),
        Vec3::new(10.0, 1.0, 10.0),
    )
    .unwrap();
    scene.attach(entity, replacement).unwrap();

    assert_eq!(scene.physics().body_count(), 1);
    assert_eq!(scene.get::<PhysicsBody>(entity).unwrap().body_type(), BodyType::Static);
    assert_eq!(scene.get::<PhysicsBody>(entity).unwrap().mass(), 0.0);
    assert_eq!(scene.physics().resource_counts().bodies, 1);
}

#[test]
fn body_rotation_round_trips() {
    let mut scene = earth_scene();
    let entity = spawn_box(&mut scene, Vec3::zeros(), BodyType::Kinematic);
    let rotation = Quat::from_euler_angles(0.0, 0.5, 0.0);

    scene.set_body_rotation(entity, rotation).unwrap();
    assert_relative_eq!(scene.body_rotation(entity).unwrap(), rotation, epsilon = 1e-6);
}

#[test]
fn render_refreshes_model_and_mvp_uniforms() {
    let mut scene = Scene::default();
    let parent = scene.create_entity();
    scene.attach(parent, Transform::from_position(Vec3::new(0.0, 5.0, 0.0))).unwrap();
    let child = scene.create_entity();
    scene.attach(child, Transform::from_position(Vec3::new(2.0, 0.0, 0.0))).unwrap();
    scene.set_parent(child, Some(parent)).unwrap();

    let material = Material::new("brick").shared();
    scene.attach(child, Renderer::new(material.clone(), MeshHandle(9))).unwrap();

    let view_projection = Mat4::new_scaling(2.0);
    let camera: SharedCamera = Rc::new(RefCell::new(FixedCamera(view_projection)));
    scene.set_camera(&camera);

    // Move the parent after reparenting; the render pass must pick it up.
    scene.get_mut::<Transform>(parent).unwrap().set_position(Vec3::new(0.0, 6.0, 0.0));

    let mut backend = RecordingBackend::default();
    let report = scene.render(&mut backend);
    assert_eq!(report.drawn, 1);
    assert_eq!(backend.draws, vec![MeshHandle(9)]);
    assert_eq!(backend.bound, vec!["brick".to_string()]);

    let expected_model = Mat4::new_translation(&Vec3::new(2.0, 6.0, 0.0));
    let material = material.borrow();
    assert_relative_eq!(*material.matrix_uniform(MODEL_UNIFORM).unwrap(), expected_model);
    assert_relative_eq!(
        *material.matrix_uniform(MVP_UNIFORM).unwrap(),
        view_projection * expected_model
    );
}

#[test]
fn render_without_camera_skips_mvp_refresh() {
    let mut scene = Scene::default();
    let entity = scene.create_entity();
    scene.attach(entity, Transform::from_position(Vec3::new(1.0, 1.0, 1.0))).unwrap();
    let material = Material::new("plain").shared();
    scene.attach(entity, Renderer::new(material.clone(), MeshHandle(0))).unwrap();

    {
        let camera: SharedCamera = Rc::new(RefCell::new(FixedCamera(Mat4::new_scaling(3.0))));
        scene.set_camera(&camera);
    }
    assert!(!scene.has_camera());

    let report = scene.render(&mut RecordingBackend::default());
    assert_eq!(report.drawn, 1);

    let material = material.borrow();
    assert_eq!(material.matrix_uniform(MVP_UNIFORM), Some(&Mat4::identity()));
    assert_relative_eq!(
        *material.matrix_uniform(MODEL_UNIFORM).unwrap(),
        Mat4::new_translation(&Vec3::new(1.0, 1.0, 1.0))
    );
}

#[test]
fn one_failing_renderer_does_not_stop_the_pass() {
    let mut scene = Scene::default();
    let busy_material = Material::new("busy").shared();
    let first = scene.create_entity();
    scene.attach_default::<Transform>(first).unwrap();
    scene.attach(first, Renderer::new(busy_material.clone(), MeshHandle(1))).unwrap();
    let second = scene.create_entity();
    scene.attach_default::<Transform>(second).unwrap();
    scene
        .attach(second, Renderer::new(Material::new("free").shared(), MeshHandle(2)))
        .unwrap();

    let _held = busy_material.borrow_mut();
    let mut backend = RecordingBackend::default();
    let report = scene.render(&mut backend);

    assert_eq!(report.drawn, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].entity, first);
    assert_eq!(backend.draws, vec![MeshHandle(2)]);
}

#[test]
fn renderer_without_transform_is_not_drawn() {
    let mut scene = Scene::default();
    let entity = scene.create_entity();
    scene
        .attach(entity, Renderer::new(Material::new("floating").shared(), MeshHandle(3)))
        .unwrap();

    let mut backend = RecordingBackend::default();
    assert_eq!(scene.render(&mut backend).drawn, 0);
    assert!(backend.draws.is_empty());
}

#[test]
fn copied_transform_attaches_as_root() {
    let mut scene = Scene::default();
    let parent = scene.create_entity();
    scene.attach_default::<Transform>(parent).unwrap();
    let child = scene.create_entity();
    scene.attach(child, Transform::from_position(Vec3::new(0.0, 1.0, 0.0))).unwrap();
    scene.set_parent(child, Some(parent)).unwrap();

    let copy_target = scene.create_entity();
    let child_transform = scene.get::<Transform>(child).unwrap().clone();
    scene.attach_copy(copy_target, &child_transform).unwrap();

    let copy = scene.get::<Transform>(copy_target).unwrap();
    assert_eq!(copy.parent(), None);
    assert!(copy.children().is_empty());
    assert_eq!(copy.position(), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(scene.get::<Transform>(parent).unwrap().children(), &[child]);
}
