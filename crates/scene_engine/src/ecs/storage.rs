//! Component storage
//!
//! One storage per component type, keyed by generational entity handles so a
//! stale handle can never read a component that belongs to a newer entity.

use std::any::Any;

use slotmap::SecondaryMap;

use super::component::{Component, DetachDyn};
use super::Entity;

/// Storage for all components of one type
pub struct ComponentStorage<T: Component> {
    components: SecondaryMap<Entity, T>,
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty storage
    pub fn new() -> Self {
        Self {
            components: SecondaryMap::new(),
        }
    }

    /// Insert a component, returning the one it replaced
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        self.components.insert(entity, component)
    }

    /// Get a component
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.components.get(entity)
    }

    /// Get a mutable component
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    /// Remove a component
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.components.remove(entity)
    }

    /// Whether `entity` has a component here
    pub fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(entity)
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate components in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter()
    }

    /// Iterate components mutably in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.components.iter_mut()
    }

    /// Entities that own a component in this storage
    pub fn entities(&self) -> Vec<Entity> {
        self.components.keys().collect()
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased storage interface used by the world
pub(crate) trait ErasedStorage {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn contains_entity(&self, entity: Entity) -> bool;
    fn take_boxed(&mut self, entity: Entity) -> Option<Box<dyn DetachDyn>>;
    fn detach_order(&self) -> i32;
    fn stored_count(&self) -> usize;
}

impl<T: Component> ErasedStorage for ComponentStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn take_boxed(&mut self, entity: Entity) -> Option<Box<dyn DetachDyn>> {
        self.remove(entity).map(|component| Box::new(component) as Box<dyn DetachDyn>)
    }

    fn detach_order(&self) -> i32 {
        T::DETACH_ORDER
    }

    fn stored_count(&self) -> usize {
        self.len()
    }
}
