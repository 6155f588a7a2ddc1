//! ECS Components module
//!
//! Components the scene knows how to keep in sync every frame

pub mod transform;
pub mod physics_body;
pub mod renderer;

pub use transform::Transform;
pub use physics_body::PhysicsBody;
pub use renderer::Renderer;
