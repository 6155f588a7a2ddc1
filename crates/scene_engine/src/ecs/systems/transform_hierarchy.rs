//! Transform hierarchy operations
//!
//! Parent/child links are entity handles into the transform storage. These
//! functions are the only code that edits them, so a parent's child list and
//! its children's parent links always agree.

use thiserror::Error;

use crate::ecs::components::Transform;
use crate::ecs::{Entity, World};
use crate::foundation::math::Mat4;

/// Hierarchy violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Reparenting would make a node its own ancestor
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Node being reparented
        child: Entity,
        /// Requested parent, a descendant of `child`
        parent: Entity,
    },

    /// The entity has no transform (or is not alive)
    #[error("Entity {0:?} has no transform")]
    MissingTransform(Entity),
}

/// Reparent `child` under `parent`, or make it a root when `parent` is `None`.
///
/// The child is removed from its old parent's list and appended to the new
/// one's. Its own global matrix is refreshed from the new parent's cached
/// global; descendants are refreshed by the next forward-kinematics pass.
pub fn set_parent(world: &mut World, child: Entity, parent: Option<Entity>) -> Result<(), HierarchyError> {
    let transforms = world.storage_mut::<Transform>();
    let old_parent = transforms
        .get(child)
        .ok_or(HierarchyError::MissingTransform(child))?
        .parent;

    let parent_global = match parent {
        Some(parent) => {
            let parent_transform = transforms
                .get(parent)
                .ok_or(HierarchyError::MissingTransform(parent))?;

            // Walk up from the new parent; meeting the child means a cycle.
            let mut cursor = Some(parent);
            while let Some(node) = cursor {
                if node == child {
                    return Err(HierarchyError::Cycle { child, parent });
                }
                cursor = transforms.get(node).and_then(Transform::parent);
            }
            parent_transform.global()
        }
        None => Mat4::identity(),
    };

    if old_parent == parent {
        return Ok(());
    }

    if let Some(old) = old_parent.and_then(|old| transforms.get_mut(old)) {
        old.children.retain(|&c| c != child);
    }
    if let Some(new) = parent.and_then(|new| transforms.get_mut(new)) {
        if !new.children.contains(&child) {
            new.children.push(child);
        }
    }
    if let Some(node) = transforms.get_mut(child) {
        node.parent = parent;
        node.set_parent_global(parent_global);
    }

    log::trace!("Reparented {:?}: {:?} -> {:?}", child, old_parent, parent);
    Ok(())
}

/// Recompute one node's global matrix by walking its parent chain upward,
/// refreshing every ancestor's cache on the way back down.
pub fn recompute_global(world: &mut World, entity: Entity) -> Result<Mat4, HierarchyError> {
    let transforms = world.storage_mut::<Transform>();

    let mut chain = vec![entity];
    let mut cursor = transforms
        .get(entity)
        .ok_or(HierarchyError::MissingTransform(entity))?
        .parent;
    while let Some(node) = cursor {
        chain.push(node);
        cursor = transforms.get(node).and_then(Transform::parent);
    }

    let mut global = Mat4::identity();
    for node in chain.into_iter().rev() {
        if let Some(transform) = transforms.get_mut(node) {
            global = transform.set_parent_global(global);
        }
    }
    Ok(global)
}

/// Top-down pass over the subtree rooted at `root`.
///
/// `root` is computed from its parent's cached global (not recursively), then
/// every descendant from its freshly computed parent. Children are visited in
/// attach order. Returns the number of nodes refreshed.
pub fn forward_kinematics(world: &mut World, root: Entity) -> Result<usize, HierarchyError> {
    let transforms = world.storage_mut::<Transform>();

    let start = transforms
        .get(root)
        .ok_or(HierarchyError::MissingTransform(root))?
        .parent
        .and_then(|parent| transforms.get(parent))
        .map_or_else(Mat4::identity, Transform::global);

    let mut visited = 0;
    let mut stack = vec![(root, start)];
    while let Some((entity, parent_global)) = stack.pop() {
        let Some(node) = transforms.get_mut(entity) else {
            continue;
        };
        let global = node.set_parent_global(parent_global);
        visited += 1;
        stack.extend(node.children.iter().rev().map(|&child| (child, global)));
    }
    Ok(visited)
}

/// Forward kinematics from every root transform, in storage order
pub fn forward_kinematics_all(world: &mut World) -> usize {
    let roots: Vec<Entity> = world
        .query::<Transform>()
        .filter(|(_, transform)| transform.parent.is_none())
        .map(|(entity, _)| entity)
        .collect();

    roots
        .into_iter()
        .filter_map(|root| forward_kinematics(world, root).ok())
        .sum()
}

/// Unlink a transform that has been taken out of storage.
///
/// Removes `entity` from its parent's children and orphans its own children:
/// they become roots that keep their local values.
pub fn detach_from_hierarchy(world: &mut World, entity: Entity, transform: &mut Transform) {
    let transforms = world.storage_mut::<Transform>();

    if let Some(parent) = transform.parent.take().and_then(|parent| transforms.get_mut(parent)) {
        parent.children.retain(|&c| c != entity);
    }
    for child in transform.children.drain(..) {
        if let Some(node) = transforms.get_mut(child) {
            node.parent = None;
            node.set_parent_global(Mat4::identity());
        }
    }
}
