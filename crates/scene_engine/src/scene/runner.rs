//! Script-driven frame loop
//!
//! Game code implements [`SceneScript`] to populate a scene and react to it
//! each frame; [`SceneRunner`] drives the fixed order
//! `script.update -> scene.update -> scene.render -> script.post_render`.

use super::orchestrator::{RenderReport, Scene, UpdateReport};
use crate::error::SceneError;
use crate::render::RenderBackend;

/// Game-specific behavior plugged into a scene
pub trait SceneScript {
    /// Populate the scene once, before the first frame
    fn init(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let _ = scene;
        Ok(())
    }

    /// Per-frame logic, run before the scene update
    fn update(&mut self, scene: &mut Scene, dt: f32) -> Result<(), SceneError> {
        let _ = (scene, dt);
        Ok(())
    }

    /// Per-frame logic, run after rendering (collision records are current)
    fn post_render(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let _ = scene;
        Ok(())
    }
}

/// Reports of one frame
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Frame index, starting at zero
    pub frame: u64,
    /// Scene update outcome
    pub update: UpdateReport,
    /// Scene render outcome
    pub render: RenderReport,
}

/// Owns a scene and the script driving it
pub struct SceneRunner<S: SceneScript> {
    scene: Scene,
    script: S,
    frame: u64,
}

impl<S: SceneScript> SceneRunner<S> {
    /// Take ownership of `scene` and run the script's `init`
    pub fn new(mut scene: Scene, mut script: S) -> Result<Self, SceneError> {
        script.init(&mut scene)?;
        log::info!("Scene initialized with {} entities", scene.entity_count());
        Ok(Self { scene, script, frame: 0 })
    }

    /// Run one frame
    pub fn frame(&mut self, dt: f32, backend: &mut dyn RenderBackend) -> Result<FrameReport, SceneError> {
        self.script.update(&mut self.scene, dt)?;
        let update = self.scene.update(dt);
        let render = self.scene.render(backend);
        self.script.post_render(&mut self.scene)?;

        let report = FrameReport {
            frame: self.frame,
            update,
            render,
        };
        self.frame += 1;
        Ok(report)
    }

    /// Run `frames` frames of `dt` seconds, stopping at the first script error
    pub fn run(&mut self, frames: u64, dt: f32, backend: &mut dyn RenderBackend) -> Result<Vec<FrameReport>, SceneError> {
        (0..frames).map(|_| self.frame(dt, backend)).collect()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The script
    pub fn script(&self) -> &S {
        &self.script
    }

    /// Give back the scene and script
    pub fn into_parts(self) -> (Scene, S) {
        (self.scene, self.script)
    }
}
