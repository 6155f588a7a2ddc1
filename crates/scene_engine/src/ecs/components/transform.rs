//! Transform component for the ECS system
//!
//! Local position, rotation and scale plus a cached global matrix. Parent and
//! child links are entity handles, never references, so component storage may
//! move freely. Hierarchy-wide operations live in
//! [`crate::ecs::systems::transform_hierarchy`].

use crate::ecs::systems::transform_hierarchy;
use crate::ecs::{Component, Entity, LifecycleContext};
use crate::error::SceneError;
use crate::foundation::math::{
    is_uniform_scale, quat_from_euler_degrees, quat_to_euler_degrees, translation_of, trs_matrix,
    upper_left_3x3, Mat3, Mat4, Quat, Vec3,
};

/// ECS Transform component
///
/// Setters eagerly recompute this node's global matrix from the parent global
/// cached at the last hierarchy pass. They do not touch children; run
/// forward kinematics to refresh a subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    global: Mat4,
    parent_global: Mat4,
    pub(crate) parent: Option<Entity>,
    pub(crate) children: Vec<Entity>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            global: Mat4::identity(),
            parent_global: Mat4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Component for Transform {
    fn on_attach(&mut self, _entity: Entity, _ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError> {
        // A copied transform keeps its local values but starts as a root.
        self.parent = None;
        self.children.clear();
        self.set_parent_global(Mat4::identity());
        Ok(())
    }

    fn on_detach(&mut self, entity: Entity, ctx: &mut LifecycleContext<'_>) -> Result<(), SceneError> {
        transform_hierarchy::detach_from_hierarchy(ctx.world, entity, self);
        Ok(())
    }
}

impl Transform {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self::default().with_position(position)
    }

    /// Create from local position, rotation and scale
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut transform = Self {
            position,
            rotation,
            scale,
            ..Self::default()
        };
        transform.recompute_local();
        transform
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder pattern: Set rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Local rotation as XYZ Euler angles in degrees
    pub fn rotation_degrees(&self) -> Vec3 {
        quat_to_euler_degrees(&self.rotation)
    }

    /// Replace the local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recompute_local();
    }

    /// Replace the local rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.recompute_local();
    }

    /// Replace the local rotation from XYZ Euler angles in degrees
    pub fn set_rotation_degrees(&mut self, degrees: Vec3) {
        self.set_rotation(quat_from_euler_degrees(&degrees));
    }

    /// Replace the local scale. Zero components are accepted but make the
    /// normal matrix degenerate.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.recompute_local();
    }

    /// Rotate about the parent-space axes (pre-multiplied)
    pub fn fixed_rotate(&mut self, degrees: Vec3) {
        self.rotation = quat_from_euler_degrees(&degrees) * self.rotation;
        self.recompute_local();
    }

    /// Rotate about this node's own axes (post-multiplied)
    pub fn relative_rotate(&mut self, degrees: Vec3) {
        self.rotation *= quat_from_euler_degrees(&degrees);
        self.recompute_local();
    }

    /// `translate * rotate * scale` of the local attributes
    pub fn local_matrix(&self) -> Mat4 {
        trs_matrix(&self.position, &self.rotation, &self.scale)
    }

    /// Cached global matrix
    pub fn global(&self) -> Mat4 {
        self.global
    }

    /// World-space position taken from the cached global matrix
    pub fn world_position(&self) -> Vec3 {
        translation_of(&self.global)
    }

    /// Parent entity, if any
    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    /// Children in attach order
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    /// Matrix for transforming surface normals.
    ///
    /// Under uniform local scale this is the upper-left 3x3 of the global
    /// matrix; otherwise its inverse-transpose. A singular block yields zeros.
    pub fn normal_matrix(&self) -> Mat3 {
        let upper = upper_left_3x3(&self.global);
        if is_uniform_scale(&self.scale) {
            upper
        } else {
            upper
                .try_inverse()
                .map_or_else(Mat3::zeros, |inverse| inverse.transpose())
        }
    }

    /// Cache a fresh parent global and recompute this node from it
    pub(crate) fn set_parent_global(&mut self, parent_global: Mat4) -> Mat4 {
        self.parent_global = parent_global;
        self.recompute_local();
        self.global
    }

    fn recompute_local(&mut self) {
        self.global = self.parent_global * self.local_matrix();
    }
}
