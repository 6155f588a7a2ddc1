//! ECS World implementation

use std::any::TypeId;
use std::collections::HashMap;

use slotmap::SlotMap;
use thiserror::Error;

use super::component::{Component, DetachDyn};
use super::storage::{ComponentStorage, ErasedStorage};
use super::Entity;

/// Errors raised by the component store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle refers to an entity that was destroyed (or never existed)
    #[error("Entity {0:?} is not alive")]
    DeadEntity(Entity),

    /// The entity has no component of the requested kind
    #[error("Entity {entity:?} has no {component} component")]
    MissingComponent {
        /// Entity that was queried
        entity: Entity,
        /// Short type name of the missing component
        component: &'static str,
    },
}

/// ECS World containing all entities and components
pub struct World {
    entities: SlotMap<Entity, ()>,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            storages: HashMap::new(),
        }
    }

    /// Create a new entity with no components
    pub fn spawn(&mut self) -> Entity {
        self.entities.insert(())
    }

    /// Whether `entity` refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Fail with [`EcsError::DeadEntity`] unless `entity` is alive
    pub fn ensure_alive(&self, entity: Entity) -> Result<(), EcsError> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::DeadEntity(entity))
        }
    }

    /// Free the entity's slot. Components still attached are dropped without
    /// running their detach hooks; use [`World::take_all`] first to tear them down.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.ensure_alive(entity)?;
        for storage in self.storages.values_mut() {
            drop(storage.take_boxed(entity));
        }
        self.entities.remove(entity);
        Ok(())
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate live entities in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    /// Store a component, returning the one it replaced.
    /// No lifecycle hooks run here.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Result<Option<T>, EcsError> {
        self.ensure_alive(entity)?;
        Ok(self.storage_mut::<T>().insert(entity, component))
    }

    /// Borrow a component
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.ensure_alive(entity)?;
        self.storage::<T>()
            .and_then(|storage| storage.get(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Mutably borrow a component
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.ensure_alive(entity)?;
        self.storage_mut::<T>()
            .get_mut(entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Borrow a component if present
    pub fn try_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>().and_then(|storage| storage.get(entity))
    }

    /// Mutably borrow a component if present
    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<ComponentStorage<T>>())
            .and_then(|storage| storage.get_mut(entity))
    }

    /// Whether `entity` has a `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.try_get::<T>(entity).is_some()
    }

    /// Remove a component without running hooks
    pub fn take<T: Component>(&mut self, entity: Entity) -> Result<T, EcsError> {
        self.ensure_alive(entity)?;
        self.storage_mut::<T>()
            .remove(entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Remove every component of `entity`, ordered by ascending detach order
    pub fn take_all(&mut self, entity: Entity) -> Vec<(i32, Box<dyn DetachDyn>)> {
        let mut taken: Vec<(i32, Box<dyn DetachDyn>)> = self
            .storages
            .values_mut()
            .filter(|storage| storage.contains_entity(entity))
            .filter_map(|storage| {
                let order = storage.detach_order();
                storage.take_boxed(entity).map(|component| (order, component))
            })
            .collect();
        // Stable sort keeps ties in storage order; only the explicit order matters.
        taken.sort_by_key(|(order, _)| *order);
        taken
    }

    /// Entities that own a `T`, in slot order
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        self.storage::<T>().map(ComponentStorage::entities).unwrap_or_default()
    }

    /// Iterate `(entity, component)` pairs for one component type
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(ComponentStorage::iter)
    }

    /// Number of stored `T` components
    pub fn component_count<T: Component>(&self) -> usize {
        self.storages
            .get(&TypeId::of::<T>())
            .map_or(0, |storage| storage.stored_count())
    }

    /// Storage for `T`, if any component of that type was ever inserted
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<ComponentStorage<T>>())
    }

    /// Storage for `T`, created on first use
    pub fn storage_mut<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()));
        match storage.as_any_mut().downcast_mut::<ComponentStorage<T>>() {
            Some(storage) => storage,
            None => unreachable!("storage registered under the TypeId of another component"),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn missing<T: Component>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity,
        component: short_type_name::<T>(),
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
