//! Entity-Component-System implementation
//!
//! Generational entity handles, per-type component storage and the
//! lifecycle hooks the scene runs when components come and go.

pub mod world;
pub mod entity;
pub mod component;
pub mod storage;
pub mod components;
pub mod systems;

pub use world::{EcsError, World};
pub use entity::Entity;
pub use component::{Component, DetachDyn, LifecycleContext};
pub use storage::ComponentStorage;
