//! Collision shapes
//!
//! Shapes are stored in body space and moved to world space on demand for the
//! broad and narrow phases.

use crate::foundation::math::{Isometry, Vec3};

use super::PhysicsError;

/// Collision shape types (stored in BODY SPACE)
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    /// Axis-aligned box in body space, centered on the body origin
    Box {
        /// Half the box size along each local axis
        half_extents: Vec3,
    },
}

impl CollisionShape {
    /// Box shape from half-extents.
    ///
    /// Zero extents are accepted (a flat or point-like box); the caller is
    /// responsible for sensible geometry. Negative or non-finite extents fail.
    pub fn cuboid(half_extents: Vec3) -> Result<Self, PhysicsError> {
        if half_extents.iter().all(|e| e.is_finite() && *e >= 0.0) {
            Ok(Self::Box { half_extents })
        } else {
            Err(PhysicsError::ShapeCreation(format!(
                "box half-extents must be finite and non-negative, got {half_extents:?}"
            )))
        }
    }

    /// Box sized to an entity scale (half-extents are half the scale)
    pub fn from_scale(scale: Vec3) -> Result<Self, PhysicsError> {
        Self::cuboid(scale * 0.5)
    }

    /// Half-extents of the box
    pub fn half_extents(&self) -> Vec3 {
        match self {
            Self::Box { half_extents } => *half_extents,
        }
    }

    /// The shape placed at `transform`
    pub fn world_box(&self, transform: &Isometry) -> OrientedBox {
        match self {
            Self::Box { half_extents } => {
                let rotation = transform.rotation.to_rotation_matrix();
                let basis = rotation.matrix();
                OrientedBox {
                    center: transform.translation.vector,
                    axes: [
                        basis.column(0).into_owned(),
                        basis.column(1).into_owned(),
                        basis.column(2).into_owned(),
                    ],
                    half_extents: *half_extents,
                }
            }
        }
    }

    /// Tight world-space bounds of the shape placed at `transform`
    pub fn world_aabb(&self, transform: &Isometry) -> Aabb {
        self.world_box(transform).aabb()
    }
}

/// Box in world space: center, unit local axes and half-extents along them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center
    pub center: Vec3,
    /// Local X, Y and Z axes in world space
    pub axes: [Vec3; 3],
    /// Half size along each local axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Half the length of the box's shadow on `axis` (a unit vector)
    pub fn projected_radius(&self, axis: &Vec3) -> f32 {
        (0..3)
            .map(|i| self.half_extents[i] * self.axes[i].dot(axis).abs())
            .sum()
    }

    /// Enclosing world-space AABB
    pub fn aabb(&self) -> Aabb {
        let extent = Vec3::from_fn(|row, _| self.projected_radius(&Vec3::ith(row, 1.0)));
        Aabb::new(self.center - extent, self.center + extent)
    }

    /// Corners of the face whose outward normal is closest to `direction`,
    /// in winding order
    pub fn face_towards(&self, direction: &Vec3) -> [Vec3; 4] {
        let axis = (0..3)
            .max_by(|&i, &j| {
                let di = self.axes[i].dot(direction).abs();
                let dj = self.axes[j].dot(direction).abs();
                di.total_cmp(&dj)
            })
            .unwrap_or(0);
        let normal = if self.axes[axis].dot(direction) >= 0.0 {
            self.axes[axis]
        } else {
            -self.axes[axis]
        };
        let center = self.center + normal * self.half_extents[axis];
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        let u = self.axes[u] * self.half_extents[u];
        let v = self.axes[v] * self.half_extents[v];
        [center + u + v, center - u + v, center - u - v, center + u - v]
    }

    /// End points of the edge parallel to local axis `axis` that reaches
    /// furthest along `direction`
    pub fn edge_towards(&self, axis: usize, direction: &Vec3) -> (Vec3, Vec3) {
        let mut middle = self.center;
        for k in (0..3).filter(|&k| k != axis) {
            let sign = if self.axes[k].dot(direction) >= 0.0 { 1.0 } else { -1.0 };
            middle += self.axes[k] * (sign * self.half_extents[k]);
        }
        let along = self.axes[axis] * self.half_extents[axis];
        (middle - along, middle + along)
    }
}

/// World-space axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create from corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Grow by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        let grow = Vec3::repeat(margin);
        Self::new(self.min - grow, self.max + grow)
    }

    /// Whether the boxes overlap or touch
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }
}
