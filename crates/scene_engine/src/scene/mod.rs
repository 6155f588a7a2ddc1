//! Scene runtime
//!
//! The [`Scene`] orchestrates entities, physics and rendering each frame;
//! [`SceneRunner`] drives a scene with game-specific [`SceneScript`] hooks.

pub mod orchestrator;
pub mod runner;

pub use orchestrator::{RenderReport, Scene, SharedCamera, UpdateReport};
pub use runner::{FrameReport, SceneRunner, SceneScript};
