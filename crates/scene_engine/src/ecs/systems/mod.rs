//! ECS Systems module

pub mod transform_hierarchy;

pub use transform_hierarchy::{
    detach_from_hierarchy, forward_kinematics, forward_kinematics_all, recompute_global, set_parent,
    HierarchyError,
};
