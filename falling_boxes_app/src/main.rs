//! Falling boxes demo
//!
//! Headless run of the scene runtime: a static floor, a stack of dynamic
//! boxes dropped from above and a camera. Collisions are logged as they are
//! detected each frame.
//!
//! Usage: `falling_boxes [config.toml|config.ron] [frames]`

use std::cell::RefCell;
use std::rc::Rc;

use scene_engine::foundation::logging;
use scene_engine::foundation::math::lerp_vec3;
use scene_engine::prelude::*;
use thiserror::Error;

const DEFAULT_FRAMES: u64 = 240;
const FRAME_DT: f32 = 1.0 / 60.0;
const BOX_COUNT: usize = 4;
const DOLLY_SECONDS: f32 = 3.0;

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Invalid frame count '{0}'")]
    FrameCount(String),
}

struct FallingBoxes {
    camera: Rc<RefCell<Camera>>,
    camera_start: Vec3,
    camera_end: Vec3,
    floor: Option<Entity>,
    boxes: Vec<Entity>,
    contacts_seen: usize,
    elapsed: f32,
}

impl FallingBoxes {
    fn new() -> Self {
        let camera_start = Vec3::new(0.0, 6.0, 18.0);
        let camera_target = Vec3::new(0.0, 2.0, 0.0);
        let mut camera = Camera::perspective(camera_start, 45.0, 800.0 / 600.0, 0.1, 100.0);
        camera.look_at(camera_target, Vec3::y());
        Self {
            camera: Rc::new(RefCell::new(camera)),
            camera_start,
            camera_end: Vec3::new(8.0, 4.0, 10.0),
            floor: None,
            boxes: Vec::new(),
            contacts_seen: 0,
            elapsed: 0.0,
        }
    }

    fn spawn_box(
        scene: &mut Scene,
        transform: Transform,
        body_type: BodyType,
        mass: f32,
        material: SharedMaterial,
    ) -> Result<Entity, SceneError> {
        let entity = scene.create_entity();
        let body = PhysicsBody::from_transform(&transform, body_type, mass)?;
        scene.attach(entity, transform)?;
        scene.attach(entity, body)?;
        scene.attach(entity, Renderer::new(material, MeshHandle(0)))?;
        Ok(entity)
    }
}

impl SceneScript for FallingBoxes {
    fn init(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let camera: SharedCamera = self.camera.clone();
        scene.set_camera(&camera);

        let floor = Transform::from_position(Vec3::new(0.0, -0.5, 0.0)).with_scale(Vec3::new(20.0, 1.0, 20.0));
        self.floor = Some(Self::spawn_box(
            scene,
            floor,
            BodyType::Static,
            0.0,
            Material::new("concrete").shared(),
        )?);

        let wood = Material::new("wood").shared();
        for i in 0..BOX_COUNT {
            #[allow(clippy::cast_precision_loss)]
            let height = 3.0 + 2.5 * i as f32;
            let transform = Transform::from_position(Vec3::new(0.1 * height, height, 0.0))
                .with_rotation(Quat::from_euler_angles(0.0, 0.2 * height, 0.0));
            self.boxes.push(Self::spawn_box(scene, transform, BodyType::Dynamic, 1.0, wood.clone())?);
        }
        log::info!("Spawned floor and {} boxes", self.boxes.len());
        Ok(())
    }

    fn update(&mut self, _scene: &mut Scene, dt: f32) -> Result<(), SceneError> {
        self.elapsed += dt;
        let t = (self.elapsed / DOLLY_SECONDS).min(1.0);
        self.camera
            .borrow_mut()
            .set_position(lerp_vec3(&self.camera_start, &self.camera_end, t));
        Ok(())
    }

    fn post_render(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        for record in scene.collisions() {
            log::debug!("Contact: {:?} <-> {:?}", record.entity_a, record.entity_b);
        }
        let floor_contacts = self.floor.map_or(0, |floor| scene.collisions_involving(floor).count());
        if scene.collisions().len() != self.contacts_seen {
            log::info!(
                "{} contact pair(s), {} touching the floor",
                scene.collisions().len(),
                floor_contacts
            );
            self.contacts_seen = scene.collisions().len();
        }
        Ok(())
    }
}

fn run() -> Result<(), AppError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("Loading scene configuration from {}", path);
            SceneConfig::load_from_file(&path).map_err(SceneError::from)?
        }
        None => SceneConfig::default().with_gravity(Vec3::new(0.0, -9.8, 0.0)),
    };
    let frames = match args.next() {
        Some(raw) => raw.parse::<u64>().map_err(|_| AppError::FrameCount(raw))?,
        None => DEFAULT_FRAMES,
    };

    let scene = Scene::new(config)?;
    let mut runner = SceneRunner::new(scene, FallingBoxes::new())?;
    let mut backend = LoggingBackend::new();

    let reports = runner.run(frames, FRAME_DT, &mut backend)?;
    let failures: usize = reports
        .iter()
        .map(|report| report.update.failures.len() + report.render.failures.len())
        .sum();

    for &entity in &runner.script().boxes {
        let position = runner.scene().body_position(entity)?;
        log::info!("Box {:?} settled at {:.3?}", entity, position);
    }
    log::info!(
        "Ran {} frames: {} draw call(s), {} entity failure(s)",
        runner.frame_count(),
        backend.draw_calls(),
        failures
    );
    Ok(())
}

fn main() {
    logging::init_with_level(log::LevelFilter::Info);

    if let Err(error) = run() {
        log::error!("Falling boxes demo failed: {}", error);
        std::process::exit(1);
    }
}
